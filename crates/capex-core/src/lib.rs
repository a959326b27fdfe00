//! # capex-core: Capacity Expansion Data Model
//!
//! Read-only inputs for multi-year capacity expansion planning:
//!
//! - [`Catalog`]: candidate projects with cost, lead time, capacity, and
//!   efficiency gain
//! - [`Horizon`]: ordered planning years with demand and budget, plus the
//!   baseline capacity that exists before any project is built
//!
//! Both are owned by the caller and only ever borrowed by the planner, so a
//! single catalog/horizon pair can back many concurrent what-if solves.
//!
//! ## Quick Start
//!
//! ```
//! use capex_core::*;
//!
//! let catalog = Catalog::new(vec![
//!     Project::new("New Line", 3_000_000.0, 0.5, 20_000.0).with_efficiency_gain(0.10),
//! ]);
//! let horizon = Horizon::new(vec![
//!     YearRecord::new(2024, 15_000.0, 5_000_000.0),
//!     YearRecord::new(2025, 22_000.0, 5_000_000.0),
//! ]);
//!
//! validate_inputs(&catalog, &horizon).expect("inputs satisfy the contract");
//! ```

pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod horizon;
pub mod validation;

pub use catalog::{Catalog, Project, ProjectId};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{CapexError, CapexResult};
pub use horizon::{AnnualCosts, Horizon, YearRecord};
pub use validation::{
    review_inputs, validate_catalog, validate_horizon, validate_inputs, ValidationError,
};
