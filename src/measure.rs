//! Build-and-measure runner for flag trials.
//!
//! A trial sets `CFLAGS`/`CXXFLAGS` to the candidate flag set, rebuilds the
//! project (`./configure`, `make clean`, `make -j<jobs>`), then runs the check
//! command several times under an external timer (`/usr/bin/time -f %U`) and
//! averages the warm runs. Any failing step, or timer output that does not end
//! in a number, collapses the whole trial into [`Measurement::Failed`] without
//! aborting the surrounding search.
//!
//! The [`Benchmark`] trait is the narrow seam between the search and the build
//! system, so the search logic can be exercised against a scripted fake.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FlagTuneError, Result};
use crate::flags::FlagSet;

/// Default external timer utility.
pub const DEFAULT_TIMER: &str = "/usr/bin/time";

/// Default number of check runs per trial (first run is warm-up).
pub const DEFAULT_RUNS: usize = 4;

/// Outcome of measuring one flag set.
///
/// Replaces the classic "infinite time on failure" sentinel with an explicit
/// tag so a failed trial can never be compared as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    /// Average user-CPU seconds over the warm check runs.
    Seconds(f64),
    /// Build, check, or timer-output failure; worse than any success.
    Failed,
}

impl Measurement {
    /// Strict-improvement comparison used by the greedy search.
    ///
    /// A tie keeps the incumbent; a failure never wins.
    pub fn improves_on(&self, best: &Measurement) -> bool {
        match (self, best) {
            (Measurement::Seconds(a), Measurement::Seconds(b)) => a < b,
            (Measurement::Seconds(_), Measurement::Failed) => true,
            (Measurement::Failed, _) => false,
        }
    }

    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            Measurement::Seconds(s) => Some(*s),
            Measurement::Failed => None,
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measurement::Seconds(s) => write!(f, "{:.3}s", s),
            Measurement::Failed => write!(f, "failed"),
        }
    }
}

/// Narrow build-and-measure interface the search runs against.
pub trait Benchmark {
    /// Build the project with `flags` and measure the check command.
    fn measure(&self, flags: &FlagSet) -> Measurement;
}

/// Benchmark backed by a `configure`/`make` project on disk.
#[derive(Debug, Clone)]
pub struct MakeBenchmark {
    project_dir: PathBuf,
    jobs: usize,
    runs: usize,
    check_command: String,
    timer: PathBuf,
}

impl MakeBenchmark {
    pub fn new(
        project_dir: PathBuf,
        jobs: usize,
        runs: usize,
        check_command: String,
        timer: PathBuf,
    ) -> Self {
        Self {
            project_dir,
            jobs,
            runs,
            check_command,
            timer,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Rebuild once more with the winning flags, `make` output inherited.
    ///
    /// Unlike trial builds, failures here propagate: by the time the final
    /// build runs, the flag set has already been validated by the search.
    pub fn final_build(&self, flags: &FlagSet) -> Result<()> {
        self.run_step("configure", self.configure_cmd(flags), false)?;
        self.run_step("make clean", self.make_clean_cmd(), false)?;
        self.run_step("make", self.make_build_cmd(), true)?;
        Ok(())
    }

    /// Trial build: any failing step maps to `false` rather than an error.
    fn trial_build(&self, flags: &FlagSet) -> bool {
        for (step, cmd) in [
            ("configure", self.configure_cmd(flags)),
            ("make clean", self.make_clean_cmd()),
            ("make", self.make_build_cmd()),
        ] {
            match self.run_step(step, cmd, false) {
                Ok(()) => {}
                Err(e) => {
                    warn!(step, flags = %flags.joined(), "trial build failed: {}", e);
                    return false;
                }
            }
        }
        true
    }

    /// One timed run of the check command; user-CPU seconds on success.
    fn timed_check(&self, flags: &FlagSet) -> Option<f64> {
        let joined = flags.joined();
        let output = Command::new(&self.timer)
            .args(["-f", "%U", "sh", "-c", &self.check_command])
            .current_dir(&self.project_dir)
            .env("CFLAGS", &joined)
            .env("CXXFLAGS", &joined)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                warn!(timer = %self.timer.display(), "failed to run timer: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                check = %self.check_command,
                status = ?output.status.code(),
                "check command failed"
            );
            return None;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let parsed = parse_user_time(&stderr);
        if parsed.is_none() {
            warn!("no user-CPU time in timer output: {:?}", stderr.trim());
        }
        parsed
    }

    fn configure_cmd(&self, flags: &FlagSet) -> Command {
        let joined = flags.joined();
        // Absolute path: relative program resolution against a child cwd is
        // platform-dependent.
        let mut cmd = Command::new(self.project_dir.join("configure"));
        cmd.current_dir(&self.project_dir)
            .env("CFLAGS", &joined)
            .env("CXXFLAGS", &joined);
        cmd
    }

    fn make_clean_cmd(&self) -> Command {
        let mut cmd = Command::new("make");
        cmd.arg("clean").current_dir(&self.project_dir);
        cmd
    }

    fn make_build_cmd(&self) -> Command {
        let mut cmd = Command::new("make");
        cmd.args(["-j", &self.jobs.to_string()])
            .current_dir(&self.project_dir);
        cmd
    }

    /// Run one build step to completion. `inherit_output` is only set for the
    /// final delivery build; trial builds stay quiet.
    fn run_step(&self, step: &str, mut cmd: Command, inherit_output: bool) -> Result<()> {
        if !inherit_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        debug!(step, dir = %self.project_dir.display(), "running build step");
        let status = cmd.status().map_err(|e| {
            warn!(step, "failed to spawn: {}", e);
            FlagTuneError::Io(e)
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(FlagTuneError::BuildFailed {
                step: step.to_string(),
                status: status.code(),
            })
        }
    }
}

impl Benchmark for MakeBenchmark {
    fn measure(&self, flags: &FlagSet) -> Measurement {
        if !self.trial_build(flags) {
            return Measurement::Failed;
        }

        let mut times = Vec::with_capacity(self.runs);
        for run in 0..self.runs {
            match self.timed_check(flags) {
                Some(seconds) => {
                    debug!(run, seconds, "check run complete");
                    times.push(seconds);
                }
                None => return Measurement::Failed,
            }
        }

        match warm_average(&times) {
            Some(avg) => Measurement::Seconds(avg),
            None => Measurement::Failed,
        }
    }
}

/// Parse user-CPU seconds from timer stderr.
///
/// The `%U` value is the last line the timer writes; the check command's own
/// stderr noise may precede it, so only the last non-empty line is consulted.
fn parse_user_time(stderr: &str) -> Option<f64> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
}

/// Average all but the first run, which is discarded as cold-cache warm-up.
fn warm_average(times: &[f64]) -> Option<f64> {
    let warm = times.get(1..)?;
    if warm.is_empty() {
        return None;
    }
    Some(warm.iter().sum::<f64>() / warm.len() as f64)
}
