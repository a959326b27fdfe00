//! Expansion costs CSV (one row per candidate project)

use super::{require_number, ColumnMap, ImportError, Loaded};
use anyhow::{Context, Result};
use capex_core::{Catalog, Diagnostics, Project};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const FILE: &str = "expansion costs";

pub const EXPANSION_COLUMNS: [&str; 5] = [
    "Proposed Expansion",
    "Cost (USD)",
    "Time to Build (year)",
    "Additional Capacity (units)",
    "Efficiency Gain",
];

/// Load the expansion costs CSV into a [`Catalog`] sorted by project name.
///
/// Rows with any empty field are dropped with a warning. Negative build
/// times fail the load; other range checks are left to
/// [`capex_core::validate_catalog`].
pub fn load_expansion_costs(path: impl AsRef<Path>) -> Result<Loaded<Catalog>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening expansion costs {}", path.display()))?;
    read_expansion_costs(file)
        .with_context(|| format!("loading expansion costs {}", path.display()))
}

pub fn read_expansion_costs<R: Read>(reader: R) -> Result<Loaded<Catalog>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("reading header row")?.clone();
    ColumnMap::resolve(&headers, &EXPANSION_COLUMNS[..1], FILE)?;
    let columns = ColumnMap::resolve(&headers, &EXPANSION_COLUMNS, FILE)?;

    let mut diagnostics = Diagnostics::new();
    let mut projects = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let row = index + 1;
        let record = result.with_context(|| format!("parsing expansion costs row {}", row))?;

        let cells: Vec<&str> = (0..EXPANSION_COLUMNS.len())
            .map(|slot| columns.get(&record, slot))
            .collect();
        if let Some(empty) = cells.iter().position(|c| c.is_empty()) {
            let name = if cells[0].is_empty() {
                "unnamed row".to_string()
            } else {
                format!("expansion '{}'", cells[0])
            };
            diagnostics.add_warning_at_row(
                "load",
                &format!("dropped {} with empty '{}'", name, EXPANSION_COLUMNS[empty]),
                row,
            );
            continue;
        }

        let name = cells[0].to_string();
        let cost = require_number(cells[1], row, EXPANSION_COLUMNS[1])?;
        let build_time = require_number(cells[2], row, EXPANSION_COLUMNS[2])?;
        let capacity = require_number(cells[3], row, EXPANSION_COLUMNS[3])?;
        let gain = require_number(cells[4], row, EXPANSION_COLUMNS[4])?;

        if build_time < 0.0 {
            return Err(ImportError::NegativeBuildTime {
                row,
                project: name,
                years: build_time,
            }
            .into());
        }

        projects.push(Project::new(name, cost, build_time, capacity).with_efficiency_gain(gain));
    }

    projects.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!(
        "loaded {} expansion options ({})",
        projects.len(),
        diagnostics.summary()
    );

    Ok(Loaded {
        value: Catalog::new(projects),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Proposed Expansion,Cost (USD),Time to Build (year),Additional Capacity (units),Efficiency Gain";

    #[test]
    fn test_projects_sorted_by_name() {
        let csv = format!(
            "{HEADER}\nWarehouse,1500000,2,5000,0.05\nAutomation,800000,0.5,3000,0.2\n"
        );
        let catalog = read_expansion_costs(csv.as_bytes()).unwrap().value;
        let names: Vec<&str> = catalog.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(names, vec!["Automation", "Warehouse"]);

        let automation = &catalog.projects()[0];
        assert_eq!(automation.cost, 800_000.0);
        assert_eq!(automation.lead_time_years, 0.5);
        assert!((automation.effective_capacity() - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let csv = format!("{HEADER}\nWarehouse,1500000,,5000,0.05\nLine,100,1,10,0\n");
        let loaded = read_expansion_costs(csv.as_bytes()).unwrap();
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.diagnostics.warning_count(), 1);
        assert!(loaded.diagnostics.issues[0]
            .message
            .contains("Time to Build (year)"));
    }

    #[test]
    fn test_negative_build_time_rejected() {
        let csv = format!("{HEADER}\nLine,100,-1,10,0\n");
        let err = read_expansion_costs(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::NegativeBuildTime { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_efficiency_column() {
        let csv = "Proposed Expansion,Cost (USD),Time to Build (year),Additional Capacity (units)\n";
        let err = read_expansion_costs(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expansion costs is missing columns: Efficiency Gain"
        );
    }
}
