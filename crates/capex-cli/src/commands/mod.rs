pub mod solve;
pub mod sweep;
pub mod validate;

use anyhow::{Context, Result};
use capex_algo::{LeadTimeRounding, SolverConfig};
use capex_cli::cli::{InputArgs, SolverArgs};
use capex_core::{Catalog, Diagnostics, Horizon};
use capex_io::{load_business_plan, load_expansion_costs, load_solver_config};
use tracing::warn;

/// Loaded inputs plus every warning raised while reading them.
pub struct Inputs {
    pub catalog: Catalog,
    pub horizon: Horizon,
    pub diagnostics: Diagnostics,
}

pub fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let business = load_business_plan(&args.business, args.baseline_capacity)?;
    let expansions = load_expansion_costs(&args.expansions)?;

    let mut diagnostics = business.diagnostics;
    diagnostics.merge(expansions.diagnostics);
    for issue in &diagnostics.issues {
        warn!("{}", issue);
    }

    Ok(Inputs {
        catalog: expansions.value,
        horizon: business.value,
        diagnostics,
    })
}

/// Start from the config file (or defaults) and apply command-line overrides.
pub fn solver_config(args: &SolverArgs) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => load_solver_config(path)?,
        None => SolverConfig::default(),
    };
    if let Some(seconds) = args.time_limit {
        config = config.with_time_limit(seconds);
    }
    if let Some(gap) = args.mip_gap {
        config = config.with_mip_gap(gap);
    }
    if let Some(nodes) = args.node_limit {
        config = config.with_node_limit(nodes);
    }
    if let Some(name) = &args.solver {
        config = config.with_backend(name.as_str());
    }
    if let Some(rounding) = &args.lead_time_rounding {
        let rounding: LeadTimeRounding = rounding.parse()?;
        config = config.with_lead_time_rounding(rounding);
    }
    if let Some(rate) = args.discount_rate {
        config = config.with_discount_rate(rate);
    }
    if args.no_diagnose {
        config = config.with_diagnosis(false);
    }
    config.validate().context("checking solver options")?;
    Ok(config)
}

pub fn thread_count(value: &str) -> usize {
    if value.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        value.parse().unwrap_or_else(|_| num_cpus::get())
    }
}

pub fn parse_scales(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid budget scale '{}'", s))
        })
        .collect()
}
