//! Command modules for the flagtune CLI
//!
//! Each command module implements a single top-level command:
//! - `tune` - Full greedy search plus final delivery build
//! - `measure` - One-shot build-and-measure of an explicit flag set
//! - `catalog` - Print the active flag catalog
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format and verbosity.

pub mod catalog;
pub mod measure;
pub mod tune;

// Re-export command handlers for easy access
pub use catalog::run_catalog;
pub use measure::run_measure;
pub use tune::run_tune;

use std::path::{Path, PathBuf};

use crate::cli::{BuildArgs, OutputFormat};
use crate::error::{FlagTuneError, Result};
use crate::flags::FlagCatalog;
use crate::measure::MakeBenchmark;

/// Shared context passed to all command handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Output format (text or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    /// Show a progress bar across trials
    pub progress: bool,
}

impl Default for CommandContext {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            verbose: false,
            progress: false,
        }
    }
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(format: OutputFormat, verbose: bool, progress: bool) -> Self {
        Self {
            format,
            verbose,
            progress,
        }
    }
}

/// Resolve the project directory from args, defaulting to the cwd.
fn project_dir(args: &BuildArgs) -> Result<PathBuf> {
    match &args.path {
        Some(path) => Ok(path.clone()),
        None => std::env::current_dir().map_err(FlagTuneError::Io),
    }
}

/// Validate options and external tools, then assemble the benchmark runner.
///
/// Fails up front rather than hours into a search: the project directory must
/// hold a configure script, and `make` plus the timer must be resolvable.
pub(crate) fn build_benchmark(args: &BuildArgs) -> Result<MakeBenchmark> {
    if args.runs < 2 {
        return Err(FlagTuneError::InvalidArgs {
            message: format!(
                "--runs must be at least 2 (one warm-up plus one timed run), got {}",
                args.runs
            ),
        });
    }

    let dir = project_dir(args)?;
    if !dir.is_dir() {
        return Err(FlagTuneError::ProjectNotFound {
            path: dir.display().to_string(),
        });
    }
    if !dir.join("configure").exists() {
        return Err(FlagTuneError::ConfigureMissing {
            path: dir.display().to_string(),
        });
    }

    which::which("make").map_err(|_| FlagTuneError::ToolMissing {
        tool: "make".to_string(),
    })?;
    which::which(&args.timer).map_err(|_| FlagTuneError::ToolMissing {
        tool: args.timer.display().to_string(),
    })?;

    let jobs = args.jobs.unwrap_or_else(num_cpus::get);

    Ok(MakeBenchmark::new(
        dir,
        jobs,
        args.runs,
        args.check_command.clone(),
        args.timer.clone(),
    ))
}

/// Load the catalog override if given, otherwise the built-in GCC catalog.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<FlagCatalog> {
    match path {
        Some(path) => FlagCatalog::from_toml_file(path),
        None => Ok(FlagCatalog::default()),
    }
}
