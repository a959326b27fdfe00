//! Solver Driver: hands an [`ExpansionModel`] to the configured backend.

use super::config::{SolverBackendKind, SolverConfig};
use super::model::ExpansionModel;
use capex_core::{CapexError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Errors from the capacity expansion planner.
///
/// Infeasible models and exhausted limits are answers, not errors; they are
/// reported through [`super::SolveResult`].
#[derive(Error, Debug, Clone)]
pub enum ExpansionError {
    /// Catalog or horizon violates the input contract
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Solver configuration is out of range or malformed
    #[error("invalid solver configuration: {0}")]
    Config(String),

    /// Backend unknown, compiled out, or failed internally
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),
}

impl From<ExpansionError> for CapexError {
    fn from(err: ExpansionError) -> Self {
        match err {
            ExpansionError::Validation(e) => CapexError::Validation(e),
            ExpansionError::Config(msg) => CapexError::Config(msg),
            ExpansionError::SolverUnavailable(msg) => CapexError::Solver(msg),
        }
    }
}

/// Why a solve stopped before proving optimality or infeasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitReason {
    TimeLimit,
    NodeLimit,
    /// Backend reported an unbounded relaxation
    Unbounded,
}

impl LimitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitReason::TimeLimit => "time limit",
            LimitReason::NodeLimit => "node limit",
            LimitReason::Unbounded => "unbounded relaxation",
        }
    }
}

/// Raw backend result over model variables.
#[derive(Debug, Clone)]
pub enum MilpOutcome {
    Optimal {
        assignment: Vec<bool>,
        objective: f64,
        /// Proven lower bound (within the configured gap of `objective`)
        bound: f64,
        nodes: usize,
    },
    Infeasible {
        nodes: usize,
    },
    LimitReached {
        /// Best feasible assignment found so far and its objective
        incumbent: Option<(Vec<bool>, f64)>,
        bound: f64,
        nodes: usize,
        reason: LimitReason,
    },
}

impl MilpOutcome {
    pub fn nodes(&self) -> usize {
        match self {
            MilpOutcome::Optimal { nodes, .. }
            | MilpOutcome::Infeasible { nodes }
            | MilpOutcome::LimitReached { nodes, .. } => *nodes,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, MilpOutcome::Infeasible { .. })
    }
}

/// Solve `model` with the backend named in `config`.
pub fn solve_milp(
    model: &ExpansionModel,
    config: &SolverConfig,
) -> Result<MilpOutcome, ExpansionError> {
    let backend = config.backend_kind()?;
    // Empty catalog: only the constant rows remain to be checked
    if model.num_vars() == 0 {
        return Ok(if model.is_feasible(&[]) {
            MilpOutcome::Optimal {
                assignment: Vec::new(),
                objective: 0.0,
                bound: 0.0,
                nodes: 0,
            }
        } else {
            MilpOutcome::Infeasible { nodes: 0 }
        });
    }
    match backend {
        SolverBackendKind::Clarabel => super::bnb::branch_and_bound(model, config),
        #[cfg(feature = "solver-highs")]
        SolverBackendKind::Highs => super::highs::solve_highs(model, config),
    }
}
