//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::measure::{DEFAULT_RUNS, DEFAULT_TIMER};

/// Greedy compiler-flag tuner for configure/make projects
#[derive(Parser, Debug)]
#[command(name = "flagtune")]
#[command(about = "Finds a near-optimal compiler flag set by building and benchmarking")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show a progress bar across trials
    #[arg(long, global = true)]
    pub progress: bool,
}

/// Available subcommands for flagtune
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full greedy search and the final build
    #[command(visible_alias = "t")]
    Tune(TuneArgs),

    /// Build and measure a single explicit flag set
    #[command(visible_alias = "m")]
    Measure(MeasureArgs),

    /// Print the active flag catalog
    Catalog(CatalogArgs),
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON report
    Json,
}

/// Options shared by every command that builds the project
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Project directory containing the configure script (default: cwd)
    #[arg(value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Parallel make jobs (default: CPU count)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Timed check runs per trial; the first is discarded as warm-up
    #[arg(long, value_name = "N", default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Command timed on each run
    #[arg(long, value_name = "CMD", default_value = "make check")]
    pub check_command: String,

    /// External timer utility (must support -f %U)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TIMER)]
    pub timer: PathBuf,
}

/// Arguments for the tune command
#[derive(Args, Debug)]
pub struct TuneArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// TOML file overriding the built-in flag catalog
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Stop after the search; skip the final delivery build
    #[arg(long)]
    pub skip_final_build: bool,
}

/// Arguments for the measure command
#[derive(Args, Debug)]
pub struct MeasureArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Flags to build with, after `--` (empty measures the baseline)
    #[arg(last = true, value_name = "FLAG")]
    pub flags: Vec<String>,
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// TOML file overriding the built-in flag catalog
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}
