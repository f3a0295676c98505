//! flagtune CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flagtune::commands::{run_catalog, run_measure, run_tune, CommandContext};
use flagtune::{Cli, Commands};

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> flagtune::Result<String> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let ctx = CommandContext::from_cli(cli.format, cli.verbose, cli.progress);

    match &cli.command {
        Commands::Tune(args) => run_tune(args, &ctx),
        Commands::Measure(args) => run_measure(args, &ctx),
        Commands::Catalog(args) => run_catalog(args, &ctx),
    }
}

/// Diagnostics go to stderr; stdout is reserved for progress lines and the
/// report. `RUST_LOG` overrides the verbosity-derived default.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "flagtune=debug" } else { "flagtune=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
