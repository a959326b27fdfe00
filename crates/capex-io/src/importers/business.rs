//! Business planning CSV (one row per year)

use super::{require_number, ColumnMap, ImportError, Loaded};
use anyhow::{Context, Result};
use capex_core::{AnnualCosts, Diagnostics, Horizon, YearRecord};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const FILE: &str = "business plan";

/// Columns the business planning file must carry, in read order.
pub const BUSINESS_COLUMNS: [&str; 15] = [
    "Year",
    "Forecasted Demand",
    "Operational Cost (USD)",
    "Required Labor Hours",
    "Required Machinery Hours",
    "Average Wage (USD)",
    "Workforce Size",
    "Labor Market Tightness",
    "Expected Total Revenue (USD)",
    "Expected Raw Material Cost (USD)",
    "Expected Compliance Cost (USD)",
    "Expected Environmental Compliance Cost (USD)",
    "Expected Labor Law Changes Impact Cost (USD)",
    "Expected Technology Investment Cost (USD)",
    "Annual Budget (USD)",
];

/// Load the business planning CSV into a [`Horizon`].
///
/// Rows with an empty `Year` are dropped with a warning; the rest are sorted
/// by year. `baseline_capacity` is the capacity available before any
/// expansion.
pub fn load_business_plan(
    path: impl AsRef<Path>,
    baseline_capacity: f64,
) -> Result<Loaded<Horizon>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening business plan {}", path.display()))?;
    read_business_plan(file, baseline_capacity)
        .with_context(|| format!("loading business plan {}", path.display()))
}

/// Same as [`load_business_plan`], from any reader.
pub fn read_business_plan<R: Read>(reader: R, baseline_capacity: f64) -> Result<Loaded<Horizon>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("reading header row")?.clone();
    // Year first, so a wrong file reports only that column
    ColumnMap::resolve(&headers, &BUSINESS_COLUMNS[..1], FILE)?;
    let columns = ColumnMap::resolve(&headers, &BUSINESS_COLUMNS, FILE)?;

    let mut diagnostics = Diagnostics::new();
    let mut by_year: BTreeMap<i32, YearRecord> = BTreeMap::new();
    let mut duplicates = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let row = index + 1;
        let record = result.with_context(|| format!("parsing business plan row {}", row))?;

        let year_raw = columns.get(&record, 0);
        if year_raw.is_empty() {
            diagnostics.add_warning_at_row("load", "dropped row with empty Year", row);
            continue;
        }
        let year = parse_year(year_raw, row)?;

        let mut values = [0.0; BUSINESS_COLUMNS.len()];
        for (slot, column) in BUSINESS_COLUMNS.iter().enumerate().skip(1) {
            values[slot] = require_number(columns.get(&record, slot), row, *column)?;
        }

        let costs = AnnualCosts {
            operational_cost: values[2],
            required_labor_hours: values[3],
            required_machinery_hours: values[4],
            average_wage: values[5],
            workforce_size: values[6],
            labor_market_tightness: values[7],
            expected_revenue: values[8],
            raw_material_cost: values[9],
            compliance_cost: values[10],
            environmental_compliance_cost: values[11],
            labor_law_impact_cost: values[12],
            technology_investment_cost: values[13],
        };
        let year_record = YearRecord::new(year, values[1], values[14]).with_costs(costs);

        if by_year.insert(year, year_record).is_some() && !duplicates.contains(&year) {
            duplicates.push(year);
        }
    }

    if !duplicates.is_empty() {
        duplicates.sort_unstable();
        return Err(ImportError::DuplicateYears { years: duplicates }.into());
    }

    let horizon =
        Horizon::new(by_year.into_values().collect()).with_baseline_capacity(baseline_capacity);
    tracing::debug!(
        "loaded {} planning years ({})",
        horizon.len(),
        diagnostics.summary()
    );

    Ok(Loaded {
        value: horizon,
        diagnostics,
    })
}

/// Years may arrive as "2024" or "2024.0"; fractional values are rejected.
fn parse_year(raw: &str, row: usize) -> Result<i32, ImportError> {
    let invalid = || ImportError::InvalidValue {
        row,
        column: "Year",
        value: raw.to_string(),
    };
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(year);
    }
    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
        return Err(invalid());
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        BUSINESS_COLUMNS.join(",")
    }

    fn row(year: &str, demand: f64, budget: f64) -> String {
        format!("{year},{demand},100,10,5,20,40,0.6,900,50,10,5,3,7,{budget}")
    }

    #[test]
    fn test_rows_sorted_and_costs_mapped() {
        let csv = format!(
            "{}\n{}\n{}\n",
            header(),
            row("2025", 22000.0, 5e6),
            row("2024", 15000.0, 4e6)
        );
        let loaded = read_business_plan(csv.as_bytes(), 40_000.0).unwrap();
        let horizon = loaded.value;

        assert_eq!(horizon.first_year(), Some(2024));
        assert_eq!(horizon.baseline_capacity(), 40_000.0);
        let y2024 = horizon.record(2024).unwrap();
        assert_eq!(y2024.demand, 15_000.0);
        assert_eq!(y2024.budget, 4e6);
        assert_eq!(y2024.costs.labor_cost(), 200.0);
        assert_eq!(y2024.costs.machinery_cost(), 100.0);
        assert_eq!(y2024.costs.expected_revenue, 900.0);
        assert_eq!(y2024.costs.workforce_size, 40.0);
        assert!(!loaded.diagnostics.has_issues());
    }

    #[test]
    fn test_empty_year_dropped_with_warning() {
        let csv = format!(
            "{}\n{}\n{}\n",
            header(),
            row("", 1.0, 1.0),
            row("2024.0", 15000.0, 4e6)
        );
        let loaded = read_business_plan(csv.as_bytes(), 0.0).unwrap();
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.diagnostics.warning_count(), 1);
        assert_eq!(loaded.diagnostics.issues[0].row, Some(1));
    }

    #[test]
    fn test_duplicate_years_rejected() {
        let csv = format!(
            "{}\n{}\n{}\n",
            header(),
            row("2024", 1.0, 1.0),
            row("2024", 2.0, 2.0)
        );
        let err = read_business_plan(csv.as_bytes(), 0.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ImportError>(),
            Some(&ImportError::DuplicateYears { years: vec![2024] })
        );
    }

    #[test]
    fn test_missing_columns_named() {
        let csv = "Year,Forecasted Demand\n2024,10\n";
        let err = read_business_plan(csv.as_bytes(), 0.0).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Annual Budget (USD)"), "{message}");
        assert!(message.contains("Workforce Size"), "{message}");
    }

    #[test]
    fn test_missing_year_column_reported_alone() {
        let csv = "Forecasted Demand\n10\n";
        let err = read_business_plan(csv.as_bytes(), 0.0).unwrap_err();
        assert_eq!(err.to_string(), "business plan is missing columns: Year");
    }

    #[test]
    fn test_bad_number_names_row_and_column() {
        let bad = row("2024", 1.0, 1.0).replace(",900,", ",lots,");
        let csv = format!("{}\n{}\n", header(), bad);
        let err = read_business_plan(csv.as_bytes(), 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 1: column 'Expected Total Revenue (USD)' has invalid value 'lots'"
        );
    }

    #[test]
    fn test_fractional_year_rejected() {
        assert!(parse_year("2024.5", 3).is_err());
        assert_eq!(parse_year("2024.0", 3).unwrap(), 2024);
    }
}
