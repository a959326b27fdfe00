//! Solve results

use super::diagnosis::InfeasibilityCause;
use super::plan::Plan;
use super::solver::LimitReason;
use serde::Serialize;
use std::fmt;

/// Terminal status tag of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    LimitReached,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::LimitReached => "LIMIT_REACHED",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveStats {
    /// Backend that produced the answer
    pub backend: String,
    /// LP relaxations solved (0 when the structural check decided)
    pub nodes: usize,
    pub solve_time_ms: f64,
}

/// Outcome of [`super::build_and_solve`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveResult {
    /// Proven optimal (within the configured gap) and verified plan
    Optimal {
        plan: Plan,
        objective: f64,
        best_bound: f64,
        stats: SolveStats,
    },
    /// No plan satisfies every constraint
    Infeasible {
        diagnosis: Option<InfeasibilityCause>,
        stats: SolveStats,
    },
    /// Search stopped early; `incumbent` is the best verified plan found
    LimitReached {
        incumbent: Option<Plan>,
        objective: Option<f64>,
        best_bound: f64,
        reason: LimitReason,
        stats: SolveStats,
    },
}

impl SolveResult {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveResult::Optimal { .. } => SolveStatus::Optimal,
            SolveResult::Infeasible { .. } => SolveStatus::Infeasible,
            SolveResult::LimitReached { .. } => SolveStatus::LimitReached,
        }
    }

    /// Best plan available: the optimum or the incumbent at a limit
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SolveResult::Optimal { plan, .. } => Some(plan),
            SolveResult::Infeasible { .. } => None,
            SolveResult::LimitReached { incumbent, .. } => incumbent.as_ref(),
        }
    }

    pub fn objective(&self) -> Option<f64> {
        match self {
            SolveResult::Optimal { objective, .. } => Some(*objective),
            SolveResult::Infeasible { .. } => None,
            SolveResult::LimitReached { objective, .. } => *objective,
        }
    }

    /// True only for `Optimal`
    pub fn optimality_proven(&self) -> bool {
        matches!(self, SolveResult::Optimal { .. })
    }

    pub fn stats(&self) -> &SolveStats {
        match self {
            SolveResult::Optimal { stats, .. }
            | SolveResult::Infeasible { stats, .. }
            | SolveResult::LimitReached { stats, .. } => stats,
        }
    }

    /// Relative gap between incumbent and bound, when both are known
    pub fn relative_gap(&self) -> Option<f64> {
        let (objective, bound) = match self {
            SolveResult::Optimal {
                objective,
                best_bound,
                ..
            } => (*objective, *best_bound),
            SolveResult::LimitReached {
                objective: Some(objective),
                best_bound,
                ..
            } => (*objective, *best_bound),
            _ => return None,
        };
        if !bound.is_finite() {
            return None;
        }
        Some(((objective - bound) / objective.abs().max(1e-9)).max(0.0))
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Capacity Expansion Plan\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.status()));

        match self {
            SolveResult::Infeasible { diagnosis, .. } => {
                let reason = diagnosis
                    .as_ref()
                    .map_or_else(|| "not diagnosed".to_string(), |d| d.describe());
                s.push_str(&format!("Cause: {}\n", reason));
            }
            SolveResult::LimitReached { reason, .. } => {
                s.push_str(&format!("Stopped by: {}\n", reason.as_str()));
            }
            SolveResult::Optimal { .. } => {}
        }

        if let Some(objective) = self.objective() {
            s.push_str(&format!("Objective: ${:.2}\n", objective));
        }
        if let Some(gap) = self.relative_gap() {
            s.push_str(&format!("MIP Gap: {:.4}%\n", gap * 100.0));
        }
        let stats = self.stats();
        s.push_str(&format!(
            "Solver: {} ({} nodes, {:.1} ms)\n",
            stats.backend, stats.nodes, stats.solve_time_ms
        ));

        if let Some(plan) = self.plan() {
            s.push_str(&format!("Total Expansion Cost: ${:.2}\n", plan.total_cost));
            s.push_str("\nBuild Decisions:\n");
            for decision in &plan.decisions {
                match (decision.start_year, decision.completion_year) {
                    (Some(start), Some(done)) => s.push_str(&format!(
                        "  [BUILD] {} - start {}, online {} - ${:.2}\n",
                        decision.project, start, done, decision.cost
                    )),
                    _ => s.push_str(&format!("  [SKIP]  {}\n", decision.project)),
                }
            }

            s.push_str("\nYear    Spend          Budget         Capacity    Demand\n");
            for year in &plan.ledger {
                s.push_str(&format!(
                    "{:<6}  {:>13.2}  {:>13.2}  {:>10.1}  {:>10.1}\n",
                    year.year, year.expansion_spend, year.budget, year.capacity, year.demand
                ));
            }
        }

        s
    }
}
