use capex_cli::cli::{Cli, Commands};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::{solve, sweep, validate};

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = match &cli.command {
        Commands::Solve {
            inputs,
            solver,
            out,
        } => {
            info!("solving expansion plan");
            solve::handle(inputs, solver, out.as_deref())
        }
        Commands::Validate { inputs } => validate::handle(inputs),
        Commands::Sweep {
            inputs,
            solver,
            scales,
            threads,
            out,
        } => sweep::handle(inputs, solver, scales, threads, out.as_deref()),
    };

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
