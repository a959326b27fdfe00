//! HiGHS MILP backend (requires the `solver-highs` feature).

use super::config::SolverConfig;
use super::model::{to_values, ExpansionModel, RowSense};
use super::solver::{LimitReason, MilpOutcome};
use super::ExpansionError;
use good_lp::solvers::highs::highs as highs_solver;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel,
};
use tracing::warn;

pub(crate) fn solve_highs(
    model: &ExpansionModel,
    config: &SolverConfig,
) -> Result<MilpOutcome, ExpansionError> {
    let mut vars = ProblemVariables::new();
    let lp_vars: Vec<_> = (0..model.num_vars())
        .map(|_| vars.add(variable().binary()))
        .collect();

    let mut objective = Expression::from(0.0);
    for (var, lp_var) in model.vars().iter().zip(&lp_vars) {
        objective += var.objective * *lp_var;
    }

    let mut problem = vars
        .minimise(objective)
        .using(highs_solver)
        .set_verbose(false)
        .set_option("mip_rel_gap", config.mip_gap);
    if let Some(limit) = config.time_limit_seconds {
        problem = problem.set_time_limit(limit);
    }

    for row in model.rows() {
        let mut expr = Expression::from(0.0);
        for &(i, c) in &row.terms {
            expr += c * lp_vars[i];
        }
        let rhs = row.rhs;
        problem = match row.sense {
            RowSense::LessEqual => problem.with(constraint!(expr <= rhs)),
            RowSense::GreaterEqual => problem.with(constraint!(expr >= rhs)),
            RowSense::Equal => problem.with(constraint!(expr == rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => {
            let assignment: Vec<bool> = lp_vars.iter().map(|v| solution.value(*v) > 0.5).collect();
            let feasible = model.is_feasible(&assignment);
            let objective = model.objective_value(&to_values(&assignment));

            if let Some(reason) = limit_reason(solution.status()) {
                warn!("HiGHS stopped early: {}", reason.as_str());
                return Ok(MilpOutcome::LimitReached {
                    incumbent: feasible.then_some((assignment, objective)),
                    bound: f64::NEG_INFINITY,
                    nodes: 0,
                    reason,
                });
            }
            if !feasible {
                return Err(ExpansionError::SolverUnavailable(
                    "HiGHS returned an assignment that violates the model".into(),
                ));
            }
            Ok(MilpOutcome::Optimal {
                assignment,
                objective,
                bound: objective,
                nodes: 0,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(MilpOutcome::Infeasible { nodes: 0 }),
        Err(ResolutionError::Unbounded) => Ok(MilpOutcome::LimitReached {
            incumbent: None,
            bound: f64::NEG_INFINITY,
            nodes: 0,
            reason: LimitReason::Unbounded,
        }),
        // A limit hit before any feasible point surfaces without its status;
        // only a configured time limit can explain it.
        Err(ResolutionError::Other(NO_SOLUTION)) if config.time_limit_seconds.is_some() => {
            warn!("HiGHS found no feasible point before stopping");
            Ok(MilpOutcome::LimitReached {
                incumbent: None,
                bound: f64::NEG_INFINITY,
                nodes: 0,
                reason: LimitReason::TimeLimit,
            })
        }
        Err(e) => Err(ExpansionError::SolverUnavailable(format!(
            "HiGHS failed: {:?}",
            e
        ))),
    }
}

const NO_SOLUTION: &str = "NoSolutionFound";

/// Map the HiGHS solution status onto a stop reason.
///
/// `GapLimit` means HiGHS met the configured `mip_rel_gap`, which is the
/// same acceptance rule the built-in search uses, so it counts as optimal.
/// good_lp folds the iteration, solution-count, interrupt, and memory limits
/// into `TimeLimit`; they are all reported as a time limit here.
fn limit_reason(status: SolutionStatus) -> Option<LimitReason> {
    match status {
        SolutionStatus::Optimal | SolutionStatus::GapLimit => None,
        SolutionStatus::TimeLimit => Some(LimitReason::TimeLimit),
    }
}
