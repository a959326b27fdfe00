//! Result writers
//!
//! Report totals add the informational annual costs from the horizon to
//! the plan's expansion spend; the optimizer itself only ever sees the
//! expansion spend.

use anyhow::{Context, Result};
use capex_algo::{Plan, SolveResult};
use capex_core::Horizon;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPANSION_PLAN_FILE: &str = "expansion_plan.csv";
pub const COST_BREAKDOWN_FILE: &str = "annual_cost_breakdown.csv";
pub const SUMMARY_FILE: &str = "summary_metrics.txt";
pub const RESULT_JSON_FILE: &str = "plan.json";

/// One row of `expansion_plan.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    #[serde(rename = "Year")]
    pub year: i32,
    /// Projects starting this year, comma-joined, or "None"
    #[serde(rename = "Selected_Expansions")]
    pub selected_expansions: String,
    #[serde(rename = "Annual_Budget")]
    pub annual_budget: f64,
    #[serde(rename = "Annual_Total_Cost")]
    pub annual_total_cost: f64,
    #[serde(rename = "Annual_Budget_Savings")]
    pub annual_budget_savings: f64,
}

/// One row of `annual_cost_breakdown.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Expansion_Spend")]
    pub expansion_spend: f64,
    #[serde(rename = "Operational_Cost")]
    pub operational_cost: f64,
    #[serde(rename = "Labor_Cost")]
    pub labor_cost: f64,
    #[serde(rename = "Machinery_Cost")]
    pub machinery_cost: f64,
    #[serde(rename = "Raw_Material_Cost")]
    pub raw_material_cost: f64,
    #[serde(rename = "Compliance_Cost")]
    pub compliance_cost: f64,
    #[serde(rename = "Environmental_Compliance_Cost")]
    pub environmental_compliance_cost: f64,
    #[serde(rename = "Labor_Law_Impact_Cost")]
    pub labor_law_impact_cost: f64,
    #[serde(rename = "Technology_Investment_Cost")]
    pub technology_investment_cost: f64,
    #[serde(rename = "Total_Cost")]
    pub total_cost: f64,
}

/// Horizon-wide totals for `summary_metrics.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub total_budget: f64,
    pub total_cost: f64,
    pub total_budget_savings: f64,
}

impl SummaryMetrics {
    pub fn render(&self) -> String {
        [
            "Capacity planning summary".to_string(),
            format!("Total revenue: {}", format_thousands(self.total_revenue)),
            format!("Total budget: {}", format_thousands(self.total_budget)),
            format!("Total cost: {}", format_thousands(self.total_cost)),
            format!(
                "Total budget savings: {}",
                format_thousands(self.total_budget_savings)
            ),
        ]
        .join("\n")
    }
}

pub fn cost_rows(plan: &Plan, horizon: &Horizon) -> Vec<CostRow> {
    plan.ledger
        .iter()
        .filter_map(|ledger| {
            let costs = &horizon.record(ledger.year)?.costs;
            Some(CostRow {
                year: ledger.year,
                expansion_spend: ledger.expansion_spend,
                operational_cost: costs.operational_cost,
                labor_cost: costs.labor_cost(),
                machinery_cost: costs.machinery_cost(),
                raw_material_cost: costs.raw_material_cost,
                compliance_cost: costs.compliance_cost,
                environmental_compliance_cost: costs.environmental_compliance_cost,
                labor_law_impact_cost: costs.labor_law_impact_cost,
                technology_investment_cost: costs.technology_investment_cost,
                total_cost: ledger.expansion_spend + costs.total(),
            })
        })
        .collect()
}

pub fn plan_rows(plan: &Plan, horizon: &Horizon) -> Vec<PlanRow> {
    cost_rows(plan, horizon)
        .into_iter()
        .zip(&plan.ledger)
        .map(|(cost, ledger)| {
            let selected_expansions = if ledger.projects_started.is_empty() {
                "None".to_string()
            } else {
                ledger.projects_started.join(", ")
            };
            PlanRow {
                year: cost.year,
                selected_expansions,
                annual_budget: ledger.budget,
                annual_total_cost: cost.total_cost,
                annual_budget_savings: ledger.budget - cost.total_cost,
            }
        })
        .collect()
}

pub fn summary_metrics(plan: &Plan, horizon: &Horizon) -> SummaryMetrics {
    let rows = plan_rows(plan, horizon);
    SummaryMetrics {
        total_revenue: horizon.total_revenue(),
        total_budget: horizon.total_budget(),
        total_cost: rows.iter().map(|r| r.annual_total_cost).sum(),
        total_budget_savings: rows.iter().map(|r| r.annual_budget_savings).sum(),
    }
}

fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV writer for {}", path.display()))?;
    for row in rows {
        wtr.serialize(row).context("writing CSV record")?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

pub fn write_expansion_plan(plan: &Plan, horizon: &Horizon, path: &Path) -> Result<()> {
    write_rows(&plan_rows(plan, horizon), path)
}

pub fn write_cost_breakdown(plan: &Plan, horizon: &Horizon, path: &Path) -> Result<()> {
    write_rows(&cost_rows(plan, horizon), path)
}

pub fn write_summary_metrics(plan: &Plan, horizon: &Horizon, path: &Path) -> Result<()> {
    let text = summary_metrics(plan, horizon).render();
    fs::write(path, text).with_context(|| format!("writing summary to {}", path.display()))
}

pub fn write_result_json(result: &SolveResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serializing SolveResult to JSON")?;
    fs::write(path, json).with_context(|| format!("writing JSON to {}", path.display()))
}

/// Write every report into `dir`, creating it if needed.
///
/// `plan.json` is always written; the CSV and summary reports only when the
/// result carries a plan. Returns the paths written.
pub fn write_all(result: &SolveResult, horizon: &Horizon, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut written = Vec::new();
    let json_path = dir.join(RESULT_JSON_FILE);
    write_result_json(result, &json_path)?;
    written.push(json_path);

    if let Some(plan) = result.plan() {
        let plan_path = dir.join(EXPANSION_PLAN_FILE);
        write_expansion_plan(plan, horizon, &plan_path)?;
        written.push(plan_path);

        let cost_path = dir.join(COST_BREAKDOWN_FILE);
        write_cost_breakdown(plan, horizon, &cost_path)?;
        written.push(cost_path);

        let summary_path = dir.join(SUMMARY_FILE);
        write_summary_metrics(plan, horizon, &summary_path)?;
        written.push(summary_path);
    }

    Ok(written)
}

/// Round to a whole number and group digits by thousands ("-1,234,568").
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
