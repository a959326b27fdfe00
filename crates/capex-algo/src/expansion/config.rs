//! Solver configuration and backend selection

use super::ExpansionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// How a fractional lead time maps onto whole planning years.
///
/// A project started in year `Y` with lead time `L` becomes usable in year
/// `Y + offset(L)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimeRounding {
    /// `offset = floor(L)`: 0.5 years completes within the start year
    #[default]
    Truncate,
    /// `offset = ceil(L)`: any fractional remainder pushes to the next year
    Ceil,
}

impl LeadTimeRounding {
    const EPS: f64 = 1e-9;

    /// Whole-year offset between construction start and first usable year
    pub fn offset_years(&self, lead_time_years: f64) -> i32 {
        let lead = lead_time_years.max(0.0);
        let offset = match self {
            LeadTimeRounding::Truncate => (lead + Self::EPS).floor(),
            LeadTimeRounding::Ceil => (lead - Self::EPS).ceil(),
        };
        offset.max(0.0) as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadTimeRounding::Truncate => "truncate",
            LeadTimeRounding::Ceil => "ceil",
        }
    }
}

impl FromStr for LeadTimeRounding {
    type Err = ExpansionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "truncate" | "floor" => Ok(LeadTimeRounding::Truncate),
            "ceil" | "ceiling" => Ok(LeadTimeRounding::Ceil),
            other => Err(ExpansionError::Config(format!(
                "unknown lead-time rounding '{}'; supported values: truncate, ceil",
                other
            ))),
        }
    }
}

/// MILP backends the driver can hand a model to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackendKind {
    /// Built-in branch-and-bound over Clarabel LP relaxations (pure Rust)
    #[default]
    Clarabel,
    /// HiGHS branch-and-cut (native)
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_BACKENDS: &[&str] = &[
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unavailable_backend(label: &str) -> ExpansionError {
    ExpansionError::SolverUnavailable(format!(
        "solver backend '{}' is not available; supported values: {}",
        label,
        SolverBackendKind::available().join(", ")
    ))
}

impl SolverBackendKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_BACKENDS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverBackendKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            SolverBackendKind::Highs => "highs",
        }
    }
}

impl FromStr for SolverBackendKind {
    type Err = ExpansionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "clarabel" | "bnb" | "branch-and-bound" | "default" => Ok(SolverBackendKind::Clarabel),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(SolverBackendKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unavailable_backend(&normalized))
                }
            }
            other => Err(unavailable_backend(other)),
        }
    }
}

/// Solver configuration
///
/// Every field has a default, so a TOML file may set any subset:
///
/// ```
/// use capex_algo::SolverConfig;
///
/// let config: SolverConfig = serde_json::from_str(r#"{"mip_gap": 0.0, "node_limit": 500}"#).unwrap();
/// assert_eq!(config.node_limit, Some(500));
/// assert_eq!(config.backend, "clarabel");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock budget for one solve (seconds); `None` = unlimited
    pub time_limit_seconds: Option<f64>,
    /// Relative optimality gap at which a search node is pruned
    pub mip_gap: f64,
    /// Maximum number of LP relaxations explored; `None` = unlimited
    pub node_limit: Option<usize>,
    /// Backend name, resolved at solve time
    pub backend: String,
    pub lead_time_rounding: LeadTimeRounding,
    /// Annual discount rate applied to start-year costs in the objective
    pub discount_rate: f64,
    /// Re-solve infeasible models with budgets relaxed to explain why
    pub diagnose_infeasibility: bool,
    /// Distance from 0/1 below which an LP value counts as integral
    pub integrality_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: Some(300.0), // 5 minutes
            mip_gap: 1e-4,
            node_limit: None,
            backend: "clarabel".to_string(),
            lead_time_rounding: LeadTimeRounding::Truncate,
            discount_rate: 0.0,
            diagnose_infeasibility: true,
            integrality_tolerance: 1e-5,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_seconds = None;
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = gap;
        self
    }

    pub fn with_node_limit(mut self, nodes: usize) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_backend(mut self, name: impl Into<String>) -> Self {
        self.backend = name.into();
        self
    }

    pub fn with_lead_time_rounding(mut self, rounding: LeadTimeRounding) -> Self {
        self.lead_time_rounding = rounding;
        self
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_diagnosis(mut self, enabled: bool) -> Self {
        self.diagnose_infeasibility = enabled;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs_f64)
    }

    /// Resolve the backend name
    pub fn backend_kind(&self) -> Result<SolverBackendKind, ExpansionError> {
        self.backend.parse()
    }

    /// Reject out-of-range tolerances and limits
    pub fn validate(&self) -> Result<(), ExpansionError> {
        if let Some(limit) = self.time_limit_seconds {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ExpansionError::Config(format!(
                    "time_limit_seconds must be a positive number, got {limit}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.mip_gap) {
            return Err(ExpansionError::Config(format!(
                "mip_gap must lie in [0, 1), got {}",
                self.mip_gap
            )));
        }
        if self.node_limit == Some(0) {
            return Err(ExpansionError::Config("node_limit must be at least 1".into()));
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(ExpansionError::Config(format!(
                "discount_rate must be greater than -1, got {}",
                self.discount_rate
            )));
        }
        if !(self.integrality_tolerance > 0.0 && self.integrality_tolerance < 0.5) {
            return Err(ExpansionError::Config(format!(
                "integrality_tolerance must lie in (0, 0.5), got {}",
                self.integrality_tolerance
            )));
        }
        Ok(())
    }
}
