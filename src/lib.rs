//! flagtune: greedy compiler-flag tuner for configure/make projects
//!
//! Discovers a near-optimal compiler flag combination by repeatedly building
//! the target project with candidate `CFLAGS`/`CXXFLAGS` and timing a check
//! command under an external timer. The search is a two-phase greedy scan:
//! pick the fastest mutually exclusive optimization level, then append each
//! independent flag and keep it only on strict improvement. A final build
//! with the winning set leaves the project ready for `make install`.
//!
//! # Example
//!
//! ```no_run
//! use flagtune::{greedy_search, FlagCatalog, MakeBenchmark};
//! use std::path::PathBuf;
//!
//! let bench = MakeBenchmark::new(
//!     PathBuf::from("/src/myproject"),
//!     8,                           // make -j jobs
//!     4,                           // check runs per trial
//!     "make check".to_string(),
//!     PathBuf::from("/usr/bin/time"),
//! );
//! let catalog = FlagCatalog::default();
//!
//! let outcome = greedy_search(&bench, &catalog, |trial| {
//!     println!("{} -> {}", trial.candidate, trial.measurement);
//! });
//! bench.final_build(&outcome.flags)?;
//! # Ok::<(), flagtune::FlagTuneError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod flags;
pub mod measure;
pub mod search;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use error::{FlagTuneError, Result};
pub use flags::{FlagCatalog, FlagSet};
pub use measure::{Benchmark, MakeBenchmark, Measurement};
pub use search::{greedy_search, Phase, SearchOutcome, Trial};
