//! Depth-first branch-and-bound over Clarabel LP relaxations.
//!
//! Nodes are partial 0/1 fixings. Each node's relaxation gives a lower
//! bound; nodes whose bound cannot beat the incumbent by more than the
//! configured gap are pruned. The search branches on the most fractional
//! variable and dives into the up-branch first.

use super::config::SolverConfig;
use super::model::{to_values, ExpansionModel};
use super::relaxation::{solve_relaxation, Relaxation};
use super::solver::{LimitReason, MilpOutcome};
use super::ExpansionError;
use tracing::{debug, warn};
use web_time::Instant;

struct Node {
    fixings: Vec<Option<bool>>,
    /// Relaxation bound of the parent (lower bound for this subtree)
    parent_bound: f64,
}

struct Search<'a> {
    model: &'a ExpansionModel,
    config: &'a SolverConfig,
    incumbent: Option<(Vec<bool>, f64)>,
    /// Smallest bound among subtrees pruned against an incumbent
    pruned_floor: f64,
    nodes: usize,
    pruned: usize,
}

impl Search<'_> {
    /// Objective a node must beat to stay open
    fn cutoff(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|(_, best)| {
            let gap = (self.config.mip_gap * best.abs()).max(1e-9 * best.abs().max(1.0));
            best - gap
        })
    }

    fn offer(&mut self, assignment: Vec<bool>) -> bool {
        if !self.model.is_feasible(&assignment) {
            return false;
        }
        let objective = self.model.objective_value(&to_values(&assignment));
        let improves = self
            .incumbent
            .as_ref()
            .map_or(true, |(_, best)| objective < *best);
        if improves {
            debug!(
                "node {}: new incumbent with objective {:.2}",
                self.nodes, objective
            );
            self.incumbent = Some((assignment, objective));
        }
        true
    }

    /// Best lower bound given the subtrees still open
    fn best_bound(&self, open: &[Node]) -> f64 {
        let open_floor = open
            .iter()
            .map(|n| n.parent_bound)
            .fold(f64::INFINITY, f64::min);
        let incumbent = self
            .incumbent
            .as_ref()
            .map_or(f64::INFINITY, |(_, best)| *best);
        open_floor.min(self.pruned_floor).min(incumbent)
    }

    fn stop(self, open: &[Node], reason: LimitReason) -> MilpOutcome {
        let bound = self.best_bound(open);
        warn!(
            "branch-and-bound stopped by {} after {} nodes ({} open)",
            reason.as_str(),
            self.nodes,
            open.len()
        );
        MilpOutcome::LimitReached {
            incumbent: self.incumbent,
            bound,
            nodes: self.nodes,
            reason,
        }
    }
}

/// Index of the free variable whose relaxed value is farthest from 0/1
fn most_fractional(values: &[f64], fixings: &[Option<bool>], tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, (&value, fix)) in values.iter().zip(fixings).enumerate() {
        if fix.is_some() {
            continue;
        }
        let distance = value.min(1.0 - value);
        if distance > tolerance && best.map_or(true, |(_, d)| distance > d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

fn children(fixings: &[Option<bool>], var: usize, parent_bound: f64) -> [Node; 2] {
    let mut down = fixings.to_vec();
    down[var] = Some(false);
    let mut up = fixings.to_vec();
    up[var] = Some(true);
    // Stack order: the up-branch is popped first
    [
        Node {
            fixings: down,
            parent_bound,
        },
        Node {
            fixings: up,
            parent_bound,
        },
    ]
}

/// Solve `model` to optimality (within `config.mip_gap`) or until a limit.
pub(crate) fn branch_and_bound(
    model: &ExpansionModel,
    config: &SolverConfig,
) -> Result<MilpOutcome, ExpansionError> {
    let started = Instant::now();
    let time_limit = config.time_limit();
    let tolerance = config.integrality_tolerance;

    let mut search = Search {
        model,
        config,
        incumbent: None,
        pruned_floor: f64::INFINITY,
        nodes: 0,
        pruned: 0,
    };
    let mut open = vec![Node {
        fixings: vec![None; model.num_vars()],
        parent_bound: f64::NEG_INFINITY,
    }];

    while let Some(node) = open.pop() {
        if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            open.push(node);
            return Ok(search.stop(&open, LimitReason::TimeLimit));
        }
        if config.node_limit.is_some_and(|limit| search.nodes >= limit) {
            open.push(node);
            return Ok(search.stop(&open, LimitReason::NodeLimit));
        }
        if search.cutoff().is_some_and(|cutoff| node.parent_bound >= cutoff) {
            search.pruned += 1;
            search.pruned_floor = search.pruned_floor.min(node.parent_bound);
            continue;
        }

        search.nodes += 1;
        let (values, bound) = match solve_relaxation(model, &node.fixings)? {
            Relaxation::Feasible { values, bound } => (values, bound),
            Relaxation::Infeasible => continue,
            Relaxation::Unbounded => {
                open.push(node);
                return Ok(search.stop(&open, LimitReason::Unbounded));
            }
        };

        if search.cutoff().is_some_and(|cutoff| bound >= cutoff) {
            search.pruned += 1;
            search.pruned_floor = search.pruned_floor.min(bound);
            continue;
        }

        match most_fractional(&values, &node.fixings, tolerance) {
            Some(var) => open.extend(children(&node.fixings, var, bound)),
            None => {
                let assignment: Vec<bool> = values.iter().map(|&v| v > 0.5).collect();
                if search.offer(assignment) {
                    continue;
                }
                // Integral within tolerance but violates a row after
                // rounding: keep branching on the first free variable.
                match node.fixings.iter().position(Option::is_none) {
                    Some(var) => open.extend(children(&node.fixings, var, bound)),
                    None => warn!(
                        "node {}: fully fixed assignment failed verification",
                        search.nodes
                    ),
                }
            }
        }
    }

    debug!(
        "branch-and-bound finished: {} nodes solved, {} pruned in {:.3}s",
        search.nodes,
        search.pruned,
        started.elapsed().as_secs_f64()
    );

    let bound = search.best_bound(&open);
    Ok(match search.incumbent {
        Some((assignment, objective)) => MilpOutcome::Optimal {
            assignment,
            objective,
            bound,
            nodes: search.nodes,
        },
        None => MilpOutcome::Infeasible {
            nodes: search.nodes,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::model::build_model;
    use capex_core::{Catalog, Horizon, Project, YearRecord};

    #[test]
    fn test_most_fractional_skips_fixed_and_integral() {
        let values = [0.5, 0.4, 1.0, 0.0];
        let fixings = [Some(true), None, None, None];
        assert_eq!(most_fractional(&values, &fixings, 1e-5), Some(1));
        assert_eq!(most_fractional(&[1.0, 0.0], &[None, None], 1e-5), None);
    }

    #[test]
    fn test_children_put_up_branch_on_top() {
        let [down, up] = children(&[None, None], 1, 3.0);
        assert_eq!(down.fixings, vec![None, Some(false)]);
        assert_eq!(up.fixings, vec![None, Some(true)]);
        assert_eq!(up.parent_bound, 3.0);
    }

    #[test]
    fn test_knapsack_style_choice() {
        // Demand 7: either A alone (cost 9) or B + C (cost 4 + 4)
        let catalog = Catalog::new(vec![
            Project::new("A", 9.0, 0.0, 10.0),
            Project::new("B", 4.0, 0.0, 5.0),
            Project::new("C", 4.0, 0.0, 5.0),
        ]);
        let horizon = Horizon::new(vec![YearRecord::new(2020, 7.0, 100.0)]);
        let config = SolverConfig::default().with_mip_gap(0.0);
        let model = build_model(&catalog, &horizon, &config);

        match branch_and_bound(&model, &config).unwrap() {
            MilpOutcome::Optimal {
                assignment,
                objective,
                bound,
                ..
            } => {
                assert!((objective - 8.0).abs() < 1e-9);
                assert!(bound <= objective + 1e-9);
                assert!(model.is_feasible(&assignment));
            }
            other => panic!("expected optimal, got {:?}", other),
        }
    }

    #[test]
    fn test_budget_makes_model_infeasible() {
        let catalog = Catalog::new(vec![Project::new("A", 9.0, 0.0, 10.0)]);
        let horizon = Horizon::new(vec![YearRecord::new(2020, 10.0, 5.0)]);
        let config = SolverConfig::default();
        let model = build_model(&catalog, &horizon, &config);
        assert!(branch_and_bound(&model, &config).unwrap().is_infeasible());
    }

    #[test]
    fn test_node_limit_stops_search() {
        let catalog = Catalog::new(vec![
            Project::new("A", 9.0, 0.0, 10.0),
            Project::new("B", 4.0, 0.0, 5.0),
            Project::new("C", 4.0, 0.0, 5.0),
        ]);
        let horizon = Horizon::new(vec![YearRecord::new(2020, 7.0, 100.0)]);
        // Root relaxation is fractional (B + 0.4 C), so one node cannot finish
        let config = SolverConfig::default().with_node_limit(1);
        let model = build_model(&catalog, &horizon, &config);

        match branch_and_bound(&model, &config).unwrap() {
            MilpOutcome::LimitReached { nodes, reason, .. } => {
                assert_eq!(nodes, 1);
                assert_eq!(reason, LimitReason::NodeLimit);
            }
            other => panic!("expected limit, got {:?}", other),
        }
    }
}
