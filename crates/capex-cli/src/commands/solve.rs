use anyhow::{Context, Result};
use capex_algo::build_and_solve;
use capex_cli::cli::{InputArgs, SolverArgs};
use capex_io::export;
use std::path::Path;
use tracing::info;

use super::{load_inputs, solver_config};

pub fn handle(inputs: &InputArgs, solver: &SolverArgs, out: Option<&Path>) -> Result<()> {
    let loaded = load_inputs(inputs)?;
    let config = solver_config(solver)?;

    info!(
        "{} candidate projects over {} years (rounding: {}, backend: {})",
        loaded.catalog.len(),
        loaded.horizon.len(),
        config.lead_time_rounding.as_str(),
        config.backend
    );

    let result = build_and_solve(&loaded.catalog, &loaded.horizon, &config)
        .context("solving capacity expansion plan")?;

    println!("{}", result.summary());

    if let Some(dir) = out {
        let written = export::write_all(&result, &loaded.horizon, dir)?;
        println!("Results written to {}:", dir.display());
        for path in written {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
