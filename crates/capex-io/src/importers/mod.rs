//! CSV importers for planning data
//!
//! Both loaders follow the same rules: headers are matched after trimming,
//! missing columns fail the load with every absent name listed, and rows that
//! are dropped rather than rejected are recorded in [`Diagnostics`].

mod business;
mod expansions;

pub use business::{load_business_plan, read_business_plan, BUSINESS_COLUMNS};
pub use expansions::{load_expansion_costs, read_expansion_costs, EXPANSION_COLUMNS};

use capex_core::Diagnostics;
use csv::StringRecord;
use thiserror::Error;

/// A loaded value plus the issues noticed while loading it.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

/// Structural problems in an input file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("{file} is missing columns: {}", .columns.join(", "))]
    MissingColumns {
        file: &'static str,
        columns: Vec<String>,
    },

    #[error("business plan contains duplicate years: {years:?}")]
    DuplicateYears { years: Vec<i32> },

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: expansion '{project}' has negative build time {years}")]
    NegativeBuildTime {
        row: usize,
        project: String,
        years: f64,
    },
}

/// Column positions resolved from a header row.
pub(crate) struct ColumnMap {
    indices: Vec<usize>,
}

impl ColumnMap {
    /// Resolve every name in `columns`, or list all missing ones.
    pub(crate) fn resolve(
        headers: &StringRecord,
        columns: &[&str],
        file: &'static str,
    ) -> Result<Self, ImportError> {
        let mut indices = Vec::with_capacity(columns.len());
        let mut missing = Vec::new();
        for &name in columns {
            match headers.iter().position(|h| h.trim() == name) {
                Some(index) => indices.push(index),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(Self { indices })
        } else {
            Err(ImportError::MissingColumns {
                file,
                columns: missing,
            })
        }
    }

    /// Trimmed cell for the `slot`-th requested column
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, slot: usize) -> &'r str {
        record.get(self.indices[slot]).map(str::trim).unwrap_or("")
    }
}

/// Parse a numeric cell, tolerating thousands separators and a currency sign.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '_'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn require_number(
    raw: &str,
    row: usize,
    column: &'static str,
) -> Result<f64, ImportError> {
    parse_number(raw).ok_or_else(|| ImportError::InvalidValue {
        row,
        column,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_number(" $3000.5 "), Some(3000.5));
        assert_eq!(parse_number("0.10"), Some(0.1));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_column_map_lists_all_missing() {
        let headers = StringRecord::from(vec!["Year", " Forecasted Demand "]);
        let map = ColumnMap::resolve(&headers, &["Year", "Forecasted Demand"], "x.csv").unwrap();
        let row = StringRecord::from(vec!["2020", " 15 "]);
        assert_eq!(map.get(&row, 1), "15");

        let err = ColumnMap::resolve(&headers, &["Year", "A", "B"], "x.csv")
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "x.csv is missing columns: A, B");
    }
}
