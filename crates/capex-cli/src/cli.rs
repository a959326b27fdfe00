use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-year capacity expansion planning", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Choose which expansion projects to start in which year
    Solve {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// Directory for plan.json and the CSV reports
        #[arg(long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
    },
    /// Check the input files without solving
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Re-solve with every annual budget scaled by each factor
    Sweep {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// Comma-separated budget scale factors
        #[arg(long, default_value = "0.5,0.75,1.0,1.25,1.5")]
        scales: String,
        /// Worker threads ("auto" or a number)
        #[arg(long, default_value = "auto")]
        threads: String,
        /// Write the sweep table as JSON to this file
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Business plan CSV (one row per year)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub business: PathBuf,
    /// Expansion costs CSV (one row per candidate project)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub expansions: PathBuf,
    /// Capacity available before any project completes (units/year)
    #[arg(long, default_value_t = 40_000.0)]
    pub baseline_capacity: f64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SolverArgs {
    /// Solver configuration TOML; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Wall-clock limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,
    /// Relative optimality gap (0 = prove optimality)
    #[arg(long)]
    pub mip_gap: Option<f64>,
    /// Maximum number of branch-and-bound nodes
    #[arg(long)]
    pub node_limit: Option<usize>,
    /// Solver backend (clarabel, highs)
    #[arg(long)]
    pub solver: Option<String>,
    /// Lead-time rounding (truncate, ceil)
    #[arg(long)]
    pub lead_time_rounding: Option<String>,
    /// Annual discount rate for start-year costs
    #[arg(long)]
    pub discount_rate: Option<f64>,
    /// Skip the infeasibility diagnosis re-solve
    #[arg(long)]
    pub no_diagnose: bool,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
