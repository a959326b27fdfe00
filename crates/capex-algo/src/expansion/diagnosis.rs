//! Explaining infeasible models
//!
//! Infeasibility has two possible sources in this formulation: demand that
//! no combination of projects can reach in time, or budgets too small to
//! pay for the projects that could. The diagnosis separates them by
//! dropping the budget rows and solving again.

use super::config::SolverConfig;
use super::model::{to_values, ConstraintFamily, ExpansionModel};
use super::solver::{solve_milp, MilpOutcome};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum InfeasibilityCause {
    /// Demand exceeds every project built as early as possible in these years
    CapacityShortfall { years: Vec<i32> },
    /// Feasible without budgets; the cheapest budget-free plan overspends in
    /// these years
    BudgetBinding { years: Vec<i32> },
    /// Infeasible even with budgets removed
    DemandUnreachable,
}

impl InfeasibilityCause {
    pub fn describe(&self) -> String {
        let join = |years: &[i32]| {
            years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            InfeasibilityCause::CapacityShortfall { years } => format!(
                "demand exceeds all reachable capacity in {}",
                join(years)
            ),
            InfeasibilityCause::BudgetBinding { years } if years.is_empty() => {
                "budgets are too small to fund a demand-covering plan".to_string()
            }
            InfeasibilityCause::BudgetBinding { years } => format!(
                "budgets are too small to fund a demand-covering plan (overspend in {})",
                join(years)
            ),
            InfeasibilityCause::DemandUnreachable => {
                "demand cannot be met within the lead-time windows".to_string()
            }
        }
    }
}

/// Classify why `model` has no feasible plan.
///
/// Returns `None` when the diagnostic re-solve itself fails or runs out of
/// budget without an answer.
pub fn diagnose(model: &ExpansionModel, config: &SolverConfig) -> Option<InfeasibilityCause> {
    let shortfall = model.capacity_shortfall_years();
    if !shortfall.is_empty() {
        return Some(InfeasibilityCause::CapacityShortfall { years: shortfall });
    }

    let relaxed = model.without_family(ConstraintFamily::Budget);
    let assignment = match solve_milp(&relaxed, config) {
        Ok(MilpOutcome::Optimal { assignment, .. }) => assignment,
        Ok(MilpOutcome::LimitReached {
            incumbent: Some((assignment, _)),
            ..
        }) => assignment,
        Ok(MilpOutcome::Infeasible { .. }) => return Some(InfeasibilityCause::DemandUnreachable),
        Ok(MilpOutcome::LimitReached { reason, .. }) => {
            warn!(
                "infeasibility diagnosis stopped by {} without a plan",
                reason.as_str()
            );
            return None;
        }
        Err(e) => {
            warn!("infeasibility diagnosis failed: {}", e);
            return None;
        }
    };

    let values = to_values(&assignment);
    let years: Vec<i32> = model
        .rows_in(ConstraintFamily::Budget)
        .filter(|row| !row.is_satisfied(&values))
        .filter_map(|row| row.year)
        .collect();
    debug!("budget-free plan overspends in {} year(s)", years.len());

    Some(InfeasibilityCause::BudgetBinding { years })
}
