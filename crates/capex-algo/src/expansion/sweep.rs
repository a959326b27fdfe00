//! Budget sensitivity sweeps
//!
//! Every scale factor gets its own horizon copy and its own model, so the
//! solves share nothing but the borrowed catalog and run in parallel on the
//! current rayon pool.

use super::config::SolverConfig;
use super::solution::{SolveResult, SolveStatus};
use super::{build_and_solve, ExpansionError};
use capex_core::{Catalog, Horizon};
use rayon::prelude::*;
use tracing::info;

/// One point of a budget sweep.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    /// Multiplier applied to every annual budget
    pub scale: f64,
    pub outcome: Result<SolveResult, ExpansionError>,
}

impl SweepPoint {
    pub fn status(&self) -> Option<SolveStatus> {
        self.outcome.as_ref().ok().map(SolveResult::status)
    }

    pub fn objective(&self) -> Option<f64> {
        self.outcome.as_ref().ok().and_then(SolveResult::objective)
    }
}

/// Solve once per budget scale factor, in parallel.
///
/// Results come back in the order of `scales`.
pub fn budget_sweep(
    catalog: &Catalog,
    horizon: &Horizon,
    config: &SolverConfig,
    scales: &[f64],
) -> Vec<SweepPoint> {
    info!("budget sweep over {} scale factors", scales.len());
    scales
        .par_iter()
        .map(|&scale| {
            let scaled = horizon.scale_budgets(scale);
            SweepPoint {
                scale,
                outcome: build_and_solve(catalog, &scaled, config),
            }
        })
        .collect()
}
