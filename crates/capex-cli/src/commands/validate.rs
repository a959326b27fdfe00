use anyhow::{Context, Result};
use capex_cli::cli::InputArgs;
use capex_core::{review_inputs, validate_inputs};

use super::load_inputs;

pub fn handle(inputs: &InputArgs) -> Result<()> {
    let loaded = load_inputs(inputs)?;
    let mut diagnostics = loaded.diagnostics;
    diagnostics.merge(review_inputs(&loaded.catalog, &loaded.horizon));

    if diagnostics.has_errors() {
        for issue in &diagnostics.issues {
            eprintln!("  {}", issue);
        }
        validate_inputs(&loaded.catalog, &loaded.horizon).context("validating planning inputs")?;
    }

    let horizon = &loaded.horizon;
    println!("Planning inputs are valid");
    if let (Some(first), Some(last)) = (horizon.first_year(), horizon.last_year()) {
        println!("  Years: {}-{} ({} rows)", first, last, horizon.len());
    }
    println!("  Candidate projects: {}", loaded.catalog.len());
    println!("  Baseline capacity: {:.1}", horizon.baseline_capacity());
    println!("  Peak demand: {:.1}", horizon.peak_demand());
    println!("  Total budget: ${:.2}", horizon.total_budget());
    println!("  {}", diagnostics.summary());
    for issue in &diagnostics.issues {
        println!("    {}", issue);
    }

    Ok(())
}
