//! Flag catalog and flag-set types.
//!
//! Two classes of candidates drive the search:
//! - Exclusive optimization levels (`-O0`..`-Ofast`): exactly one is active at
//!   a time; phase 1 picks the fastest as the seed.
//! - Independent flags: freely combinable, appended one at a time in phase 2.
//!
//! The built-in catalog targets GCC. A catalog can also be loaded from a TOML
//! file to tune with a different flag vocabulary.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlagTuneError, Result};

/// Mutually exclusive optimization levels tried in phase 1.
const EXCLUSIVE_FLAGS: &[&str] = &["-O0", "-O1", "-O2", "-O3", "-Os", "-Ofast"];

/// Independently toggle-able flags tried in phase 2, in this order.
///
/// An entry may hold more than one space-separated flag; such entries are
/// accepted or rejected as a unit.
const INDEPENDENT_FLAGS: &[&str] = &[
    "-mtune=native",
    "-fpic",
    "-fPIC",
    "-Os",
    "-march=native",
    "-fdata-sections",
    "-ffunction-sections",
    "-funroll-loops",
    "-ftree-loop-optimize",
    "-floop-parallelize-all",
    "-ftree-partial-pre",
    "-funsafe-math-optimizations",
    "-fgcse-sm",
    "-fgcse-las=all",
    "-fsched-spec-load",
    "-fsplit-loops",
    "-fsched-pressure",
    "-fipa-pta",
    "-floop-nest-optimize",
    "-fsection-anchors",
    "-ftree-loop-im",
    "-fivopts",
    "-ftree-parallelize-loops=4",
    "-ffinite-math-only",
    "-fno-signed-zeros",
    "-fno-signaling-nans -fno-trapping-math",
];

/// An ordered sequence of compiler flag strings.
///
/// Order matters only in that the flags are space-joined, in sequence, into
/// `CFLAGS`/`CXXFLAGS` for each trial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet(Vec<String>);

impl FlagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Flag set containing a single candidate entry.
    pub fn single(flag: &str) -> Self {
        Self(vec![flag.to_string()])
    }

    pub fn push(&mut self, flag: &str) {
        self.0.push(flag.to_string());
    }

    /// Copy of this set with one more candidate appended.
    pub fn with(&self, flag: &str) -> Self {
        let mut next = self.clone();
        next.push(flag);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Space-joined form, as exported into `CFLAGS`/`CXXFLAGS`.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl From<Vec<String>> for FlagSet {
    fn from(flags: Vec<String>) -> Self {
        Self(flags)
    }
}

/// The candidate flags the greedy search scans over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCatalog {
    /// Mutually exclusive optimization levels (phase 1 seed candidates).
    pub exclusive: Vec<String>,

    /// Independently combinable flags (phase 2 candidates, fixed order).
    pub independent: Vec<String>,
}

impl Default for FlagCatalog {
    fn default() -> Self {
        Self {
            exclusive: EXCLUSIVE_FLAGS.iter().map(|f| f.to_string()).collect(),
            independent: INDEPENDENT_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FlagCatalog {
    /// Load a catalog override from a TOML file.
    ///
    /// Expected shape:
    ///
    /// ```toml
    /// exclusive = ["-O2", "-O3"]
    /// independent = ["-flto", "-funroll-loops"]
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FlagTuneError::Catalog {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        let catalog: FlagCatalog = toml::from_str(&content).map_err(|e| FlagTuneError::Catalog {
            message: format!("{}: {}", path.display(), e),
        })?;

        catalog.validate()?;
        Ok(catalog)
    }

    /// Total number of trials a full search over this catalog performs.
    pub fn trial_count(&self) -> usize {
        self.exclusive.len() + self.independent.len()
    }

    fn validate(&self) -> Result<()> {
        if self.exclusive.is_empty() {
            return Err(FlagTuneError::Catalog {
                message: "catalog has no exclusive optimization levels".to_string(),
            });
        }

        if let Some(blank) = self
            .exclusive
            .iter()
            .chain(self.independent.iter())
            .find(|f| f.trim().is_empty())
        {
            return Err(FlagTuneError::Catalog {
                message: format!("catalog contains a blank flag entry: {:?}", blank),
            });
        }

        Ok(())
    }
}
