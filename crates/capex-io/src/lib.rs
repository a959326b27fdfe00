//! # capex-io: Planning Data In, Reports Out
//!
//! - [`load_business_plan`] / [`load_expansion_costs`]: CSV → [`capex_core::Horizon`] /
//!   [`capex_core::Catalog`], with dropped rows reported as diagnostics
//! - [`config::load_solver_config`]: TOML → [`capex_algo::SolverConfig`]
//! - [`export`]: `expansion_plan.csv`, `annual_cost_breakdown.csv`,
//!   `summary_metrics.txt`, and `plan.json`

pub mod config;
pub mod export;
pub mod importers;

pub use config::load_solver_config;
pub use importers::{
    load_business_plan, load_expansion_costs, read_business_plan, read_expansion_costs,
    ImportError, Loaded,
};
