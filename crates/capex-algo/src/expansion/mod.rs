//! Capacity Expansion Planning
//!
//! Chooses which candidate projects to build, and in which year each one
//! starts construction, so that cumulative capacity covers forecast demand
//! every year without any year's expansion spend exceeding its budget.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CAPACITY EXPANSION PLANNING                                            │
//! │  ───────────────────────────                                            │
//! │                                                                         │
//! │  Given:                                                                 │
//! │    • Catalog of projects (cost, lead time, capacity, efficiency gain)   │
//! │    • Planning years with demand and an expansion budget                 │
//! │    • Baseline capacity available before any project                     │
//! │                                                                         │
//! │  Decide:                                                                │
//! │    • Which projects to build (binary)                                   │
//! │    • The year each selected project starts (binary per year)            │
//! │                                                                         │
//! │  Minimize:                                                              │
//! │    Total (optionally discounted) expansion cost                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## MILP Formulation
//!
//! ```text
//! minimize    Σ_{p,y} c_p · df(y) · s_{p,y}
//!
//! subject to:
//!   x_p − Σ_y s_{p,y} = 0                               Linking
//!   Σ_y s_{p,y} ≤ 1                                     Single start
//!   B + Σ_{p, y: y + ℓ_p ≤ t} k_p · s_{p,y} ≥ D_t   ∀t   Demand
//!   Σ_p c_p · s_{p,t} ≤ Budget_t                    ∀t   Budget
//!   x_p, s_{p,y} ∈ {0,1}
//! ```
//!
//! where `ℓ_p` is the lead time rounded to whole years (see
//! [`LeadTimeRounding`]), `k_p = capacity · (1 + efficiency gain)`,
//! `B` the baseline capacity, and `df(y) = (1 + r)^-(y − y₀)`.
//! Start variables only exist for years where `y + ℓ_p` stays inside the
//! horizon. Cost is charged in full in the start year.
//!
//! ## Example
//!
//! ```
//! use capex_algo::{build_and_solve, SolveResult, SolverConfig};
//! use capex_core::{Catalog, Horizon, Project, YearRecord};
//!
//! let catalog = Catalog::new(vec![
//!     Project::new("New Production Line", 3_000_000.0, 0.5, 20_000.0)
//!         .with_efficiency_gain(0.10),
//! ]);
//! let horizon = Horizon::new(vec![
//!     YearRecord::new(2024, 15_000.0, 5_000_000.0),
//!     YearRecord::new(2025, 22_000.0, 5_000_000.0),
//! ]);
//!
//! let result = build_and_solve(&catalog, &horizon, &SolverConfig::default())?;
//! assert!(matches!(result, SolveResult::Optimal { .. }));
//! println!("{}", result.summary());
//! # Ok::<(), capex_algo::ExpansionError>(())
//! ```

mod bnb;
mod config;
mod diagnosis;
#[cfg(feature = "solver-highs")]
mod highs;
mod model;
mod plan;
mod relaxation;
mod solution;
mod solver;
pub mod sweep;

pub use config::{LeadTimeRounding, SolverBackendKind, SolverConfig};
pub use diagnosis::{diagnose, InfeasibilityCause};
pub use model::{
    build_model, discount_factor, ConstraintFamily, ExpansionModel, LinearRow, ModelVar, RowSense,
    StartOption, VarKind, FEASIBILITY_TOLERANCE,
};
pub use plan::{Plan, SelectionDecision, YearLedger};
pub use solution::{SolveResult, SolveStats, SolveStatus};
pub use solver::{solve_milp, ExpansionError, LimitReason, MilpOutcome};

use capex_core::{validate_inputs, Catalog, Horizon};
use tracing::{debug, info, warn};
use web_time::Instant;

/// Validate, build, solve, and extract a plan.
///
/// Inputs are only borrowed; every call builds its own model, so concurrent
/// calls on the same catalog and horizon are independent.
///
/// # Errors
///
/// - [`ExpansionError::Validation`] for malformed inputs
/// - [`ExpansionError::Config`] for out-of-range solver settings
/// - [`ExpansionError::SolverUnavailable`] for unknown or failing backends
pub fn build_and_solve(
    catalog: &Catalog,
    horizon: &Horizon,
    config: &SolverConfig,
) -> Result<SolveResult, ExpansionError> {
    validate_inputs(catalog, horizon)?;
    config.validate()?;
    let backend = config.backend_kind()?;

    let started = Instant::now();
    info!(
        "planning {} projects over {} years ({} backend, {} lead times)",
        catalog.len(),
        horizon.len(),
        backend.as_str(),
        config.lead_time_rounding.as_str()
    );

    let model = build_model(catalog, horizon, config);
    debug!(
        "model has {} variables and {} rows",
        model.num_vars(),
        model.rows().len()
    );

    let stats = |nodes: usize| SolveStats {
        backend: backend.as_str().to_string(),
        nodes,
        solve_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    };

    let shortfall = model.capacity_shortfall_years();
    if !shortfall.is_empty() {
        info!(
            "demand exceeds reachable capacity in {} year(s); skipping solver",
            shortfall.len()
        );
        return Ok(SolveResult::Infeasible {
            diagnosis: config
                .diagnose_infeasibility
                .then_some(InfeasibilityCause::CapacityShortfall { years: shortfall }),
            stats: stats(0),
        });
    }

    let extract = |assignment: &[bool]| {
        Plan::from_assignment(
            &model,
            catalog,
            horizon,
            assignment,
            config.lead_time_rounding,
        )
    };

    let result = match solve_milp(&model, config)? {
        MilpOutcome::Optimal {
            assignment,
            objective,
            bound,
            nodes,
        } => {
            let plan = extract(&assignment);
            if let Err(msg) = plan.verify(catalog, horizon) {
                warn!("optimal plan failed verification: {}", msg);
                return Err(ExpansionError::SolverUnavailable(format!(
                    "solver returned a plan that violates the inputs: {}",
                    msg
                )));
            }
            SolveResult::Optimal {
                plan,
                objective,
                best_bound: bound.min(objective),
                stats: stats(nodes),
            }
        }
        MilpOutcome::Infeasible { nodes } => {
            let diagnosis = if config.diagnose_infeasibility {
                diagnose(&model, config)
            } else {
                None
            };
            SolveResult::Infeasible {
                diagnosis,
                stats: stats(nodes),
            }
        }
        MilpOutcome::LimitReached {
            incumbent,
            bound,
            nodes,
            reason,
        } => {
            let incumbent = incumbent.and_then(|(assignment, objective)| {
                let plan = extract(&assignment);
                match plan.verify(catalog, horizon) {
                    Ok(()) => Some((plan, objective)),
                    Err(msg) => {
                        warn!("discarding incumbent that failed verification: {}", msg);
                        None
                    }
                }
            });
            let objective = incumbent.as_ref().map(|(_, objective)| *objective);
            SolveResult::LimitReached {
                incumbent: incumbent.map(|(plan, _)| plan),
                objective,
                best_bound: bound,
                reason,
                stats: stats(nodes),
            }
        }
    };

    info!(
        "solve finished: {} in {:.1} ms",
        result.status(),
        result.stats().solve_time_ms
    );
    Ok(result)
}
