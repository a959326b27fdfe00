//! # capex-algo: Capacity Expansion Optimization
//!
//! Turns a [`capex_core::Catalog`] and [`capex_core::Horizon`] into a binary
//! program, solves it, and returns a verified build plan.
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | Model Builder | [`build_model`] |
//! | Solver Driver | [`solve_milp`] (branch-and-bound over Clarabel, or HiGHS) |
//! | Plan Extractor | [`build_and_solve`] → [`SolveResult`] |
//! | Sensitivity | [`expansion::sweep::budget_sweep`] |
//!
//! Solves are synchronous and stateless. Inputs are borrowed, never mutated,
//! and each solve owns its model, so many what-if solves can share one
//! catalog across threads.

pub mod expansion;

pub use expansion::{
    build_and_solve, build_model, diagnose, solve_milp, ConstraintFamily, ExpansionError,
    ExpansionModel, InfeasibilityCause, LeadTimeRounding, LimitReason, MilpOutcome, Plan,
    SelectionDecision, SolveResult, SolveStats, SolveStatus, SolverBackendKind, SolverConfig,
    YearLedger,
};
