//! Input contract checks for catalogs and horizons.
//!
//! Every check runs before a model is built. The first violation found is
//! returned as a [`ValidationError`] naming the offending entity and field;
//! nothing is silently repaired.

use crate::catalog::Catalog;
use crate::diagnostics::Diagnostics;
use crate::horizon::Horizon;
use std::collections::HashSet;
use thiserror::Error;

/// A malformed or inconsistent input record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{entity}: field `{field}` {message}")]
pub struct ValidationError {
    /// Which record failed (e.g. "project 'Line A'", "year 2021", "horizon")
    pub entity: String,
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    pub fn new(entity: impl Into<String>, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field,
            message: message.into(),
        }
    }
}

fn require_finite(entity: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(entity, field, format!("must be finite, got {value}")))
    }
}

fn require_positive(entity: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(entity, field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(entity, field, format!("must be > 0, got {value}")))
    }
}

fn require_non_negative(
    entity: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    require_finite(entity, field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(entity, field, format!("must be >= 0, got {value}")))
    }
}

/// Check `{id unique, cost>0, lead_time≥0, capacity_added>0, efficiency_gain≥0}`.
///
/// An empty catalog is valid: the plan builds nothing and stands or falls on
/// baseline capacity.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for (index, project) in catalog.iter() {
        if project.id.trim().is_empty() {
            return Err(ValidationError::new(
                format!("project {index}"),
                "id",
                "must not be empty",
            ));
        }
        let entity = format!("project '{}'", project.id);
        if !seen.insert(project.id.as_str()) {
            return Err(ValidationError::new(entity, "id", "is duplicated in the catalog"));
        }
        require_positive(&entity, "cost", project.cost)?;
        require_non_negative(&entity, "lead_time_years", project.lead_time_years)?;
        require_positive(&entity, "capacity_added", project.capacity_added)?;
        require_non_negative(&entity, "efficiency_gain", project.efficiency_gain)?;
    }
    Ok(())
}

/// Check contiguous, strictly increasing years with `demand≥0` and `budget≥0`.
pub fn validate_horizon(horizon: &Horizon) -> Result<(), ValidationError> {
    if horizon.is_empty() {
        return Err(ValidationError::new("horizon", "years", "must not be empty"));
    }
    require_non_negative("horizon", "baseline_capacity", horizon.baseline_capacity())?;

    let mut previous: Option<i32> = None;
    for record in horizon.years() {
        let entity = format!("year {}", record.year);
        if let Some(prev) = previous {
            if record.year <= prev {
                return Err(ValidationError::new(
                    entity,
                    "year",
                    format!("must be strictly increasing (follows {prev})"),
                ));
            }
            if prev.checked_add(1) != Some(record.year) {
                return Err(ValidationError::new(
                    entity,
                    "year",
                    format!("must be contiguous (gap after {prev})"),
                ));
            }
        }
        require_non_negative(&entity, "demand", record.demand)?;
        require_non_negative(&entity, "budget", record.budget)?;
        previous = Some(record.year);
    }
    Ok(())
}

/// Validate both inputs, catalog first.
pub fn validate_inputs(catalog: &Catalog, horizon: &Horizon) -> Result<(), ValidationError> {
    validate_catalog(catalog)?;
    validate_horizon(horizon)
}

/// Collect contract violations and dead catalog entries as diagnostics.
///
/// A [`ValidationError`] becomes an error issue. Projects that are valid
/// but can never take part in a plan become warnings: a lead time of at
/// least the horizon length (no rounding brings them online in time) or a
/// cost above every annual budget.
pub fn review_inputs(catalog: &Catalog, horizon: &Horizon) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    if let Err(err) = validate_inputs(catalog, horizon) {
        diagnostics.add_error_with_entity(
            "validation",
            &format!("field `{}` {}", err.field, err.message),
            &err.entity,
        );
        return diagnostics;
    }

    let horizon_years = horizon.len() as f64;
    let max_budget = horizon
        .years()
        .iter()
        .map(|r| r.budget)
        .fold(0.0, f64::max);
    for project in catalog.projects() {
        let entity = format!("project '{}'", project.id);
        if project.lead_time_years.floor() >= horizon_years {
            diagnostics.add_warning_with_entity(
                "validation",
                &format!(
                    "lead time {} years cannot finish within the {}-year horizon",
                    project.lead_time_years,
                    horizon.len()
                ),
                &entity,
            );
        }
        if project.cost > max_budget {
            diagnostics.add_warning_with_entity(
                "validation",
                &format!("cost {} exceeds every annual budget", project.cost),
                &entity,
            );
        }
    }
    diagnostics
}
