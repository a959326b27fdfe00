use anyhow::{Context, Result};
use capex_algo::expansion::sweep::{budget_sweep, SweepPoint};
use capex_cli::cli::{InputArgs, SolverArgs};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use super::{load_inputs, parse_scales, solver_config, thread_count};

/// One line of the sweep table
#[derive(Debug, Serialize)]
struct SweepRow {
    scale: f64,
    status: String,
    objective: Option<f64>,
    projects_built: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&SweepPoint> for SweepRow {
    fn from(point: &SweepPoint) -> Self {
        match &point.outcome {
            Ok(result) => SweepRow {
                scale: point.scale,
                status: result.status().to_string(),
                objective: result.objective(),
                projects_built: result.plan().map(|p| p.num_selected()),
                error: None,
            },
            Err(err) => SweepRow {
                scale: point.scale,
                status: "ERROR".to_string(),
                objective: None,
                projects_built: None,
                error: Some(err.to_string()),
            },
        }
    }
}

pub fn handle(
    inputs: &InputArgs,
    solver: &SolverArgs,
    scales: &str,
    threads: &str,
    out: Option<&Path>,
) -> Result<()> {
    let scales = parse_scales(scales)?;
    if scales.is_empty() {
        anyhow::bail!("no budget scale factors given");
    }
    let loaded = load_inputs(inputs)?;
    let config = solver_config(solver)?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count(threads))
        .build()
        .context("building Rayon thread pool for budget sweep")?;
    info!("sweeping {} budget scales on {} threads", scales.len(), pool.current_num_threads());

    let points = pool.install(|| budget_sweep(&loaded.catalog, &loaded.horizon, &config, &scales));
    let rows: Vec<SweepRow> = points.iter().map(SweepRow::from).collect();

    println!("Budget Sweep\n{}", "=".repeat(40));
    println!("Scale   Status          Objective        Built");
    for row in &rows {
        let objective = row
            .objective
            .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        let built = row
            .projects_built
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        println!(
            "{:<6.2}  {:<14}  {:>15}  {:>5}",
            row.scale, row.status, objective, built
        );
        if let Some(err) = &row.error {
            println!("        {}", err);
        }
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&rows).context("serializing sweep results")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("\nResults written to {}", path.display());
    }

    Ok(())
}
