//! Greedy flag search.
//!
//! Phase 1 measures each exclusive optimization level in isolation and seeds
//! the best set with the fastest one. Phase 2 walks the independent flags in
//! catalog order, appending each to the current best set and keeping it only
//! on strict improvement.
//!
//! The scan is deliberately greedy: rejected flags are never reconsidered in
//! combination with later-accepted ones, and ties keep the smaller set. With a
//! 32-entry catalog and multi-minute rebuilds per trial, exhaustive search is
//! not an option.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::flags::{FlagCatalog, FlagSet};
use crate::measure::{Benchmark, Measurement};

/// Which scan a trial belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Exclusive,
    Independent,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Exclusive => "exclusive",
            Phase::Independent => "independent",
        }
    }
}

/// Record of one measured candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    /// The candidate entry under test.
    pub candidate: String,

    /// The complete flag set that was built and measured.
    pub flags: FlagSet,

    pub phase: Phase,

    pub measurement: Measurement,

    /// Whether the candidate was kept in the best set.
    pub accepted: bool,
}

/// Final state of a search: the accepted flags and their measured time,
/// plus the full trial log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub flags: FlagSet,
    pub time: Measurement,
    pub trials: Vec<Trial>,
}

impl SearchOutcome {
    fn new() -> Self {
        Self {
            flags: FlagSet::new(),
            time: Measurement::Failed,
            trials: Vec::new(),
        }
    }

    /// True if no candidate ever produced a successful measurement.
    pub fn all_failed(&self) -> bool {
        self.time == Measurement::Failed
    }
}

/// Run the two-phase greedy search over `catalog`.
///
/// `on_trial` is invoked after each measurement, in order, for live progress
/// reporting; the same records are retained in the returned outcome.
pub fn greedy_search<B: Benchmark>(
    bench: &B,
    catalog: &FlagCatalog,
    mut on_trial: impl FnMut(&Trial),
) -> SearchOutcome {
    let mut outcome = SearchOutcome::new();

    for flag in &catalog.exclusive {
        let flags = FlagSet::single(flag);
        let measurement = bench.measure(&flags);
        let accepted = measurement.improves_on(&outcome.time);

        if accepted {
            info!(%flag, %measurement, "new best optimization level");
            outcome.flags = flags.clone();
            outcome.time = measurement;
        }

        record(
            &mut outcome.trials,
            &mut on_trial,
            Trial {
                candidate: flag.clone(),
                flags,
                phase: Phase::Exclusive,
                measurement,
                accepted,
            },
        );
    }

    for flag in &catalog.independent {
        let flags = outcome.flags.with(flag);
        let measurement = bench.measure(&flags);
        let accepted = measurement.improves_on(&outcome.time);

        if accepted {
            info!(%flag, %measurement, "flag accepted into best set");
            outcome.flags = flags.clone();
            outcome.time = measurement;
        }

        record(
            &mut outcome.trials,
            &mut on_trial,
            Trial {
                candidate: flag.clone(),
                flags,
                phase: Phase::Independent,
                measurement,
                accepted,
            },
        );
    }

    outcome
}

fn record(trials: &mut Vec<Trial>, on_trial: &mut impl FnMut(&Trial), trial: Trial) {
    on_trial(&trial);
    trials.push(trial);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Scripted benchmark keyed on the joined flag text; unknown sets fail.
    struct ScriptedBench {
        times: Vec<(&'static str, f64)>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedBench {
        fn new(times: Vec<(&'static str, f64)>) -> Self {
            Self {
                times,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Benchmark for ScriptedBench {
        fn measure(&self, flags: &FlagSet) -> Measurement {
            let key = flags.joined();
            self.calls.borrow_mut().push(key.clone());
            match self.times.iter().find(|(k, _)| *k == key) {
                Some((_, t)) => Measurement::Seconds(*t),
                None => Measurement::Failed,
            }
        }
    }

    fn catalog(exclusive: &[&str], independent: &[&str]) -> FlagCatalog {
        FlagCatalog {
            exclusive: exclusive.iter().map(|f| f.to_string()).collect(),
            independent: independent.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_picks_minimum_exclusive_level() {
        let bench = ScriptedBench::new(vec![("-O0", 9.0), ("-O2", 5.0), ("-O3", 6.0)]);
        let outcome = greedy_search(&bench, &catalog(&["-O0", "-O2", "-O3"], &[]), |_| {});

        assert_eq!(outcome.flags.joined(), "-O2");
        assert_eq!(outcome.time, Measurement::Seconds(5.0));
    }

    #[test]
    fn test_end_to_end_scenario() {
        // -O3 wins phase 1; -flto improves and is kept; -funroll-loops does
        // not beat 3.5 and is dropped from all subsequent builds.
        let bench = ScriptedBench::new(vec![
            ("-O2", 5.0),
            ("-O3", 4.0),
            ("-O3 -flto", 3.5),
            ("-O3 -flto -funroll-loops", 4.0),
        ]);
        let outcome = greedy_search(
            &bench,
            &catalog(&["-O2", "-O3"], &["-flto", "-funroll-loops"]),
            |_| {},
        );

        assert_eq!(outcome.flags.joined(), "-O3 -flto");
        assert_eq!(outcome.time, Measurement::Seconds(3.5));

        let accepted: Vec<_> = outcome
            .trials
            .iter()
            .filter(|t| t.accepted)
            .map(|t| t.candidate.as_str())
            .collect();
        assert_eq!(accepted, vec!["-O2", "-O3", "-flto"]);
    }

    #[test]
    fn test_rejected_flag_leaves_best_set_unchanged() {
        let bench = ScriptedBench::new(vec![
            ("-O2", 5.0),
            ("-O2 -fa", 6.0),
            ("-O2 -fb", 4.0),
        ]);
        let outcome = greedy_search(&bench, &catalog(&["-O2"], &["-fa", "-fb"]), |_| {});

        // -fb is tried against plain -O2, not against the rejected -fa.
        assert_eq!(*bench.calls.borrow(), vec!["-O2", "-O2 -fa", "-O2 -fb"]);
        assert_eq!(outcome.flags.joined(), "-O2 -fb");
    }

    #[test]
    fn test_tie_keeps_smaller_set() {
        let bench = ScriptedBench::new(vec![("-O2", 5.0), ("-O2 -fa", 5.0)]);
        let outcome = greedy_search(&bench, &catalog(&["-O2"], &["-fa"]), |_| {});

        assert_eq!(outcome.flags.joined(), "-O2");
        assert_eq!(outcome.time, Measurement::Seconds(5.0));
    }

    #[test]
    fn test_all_failing_trials_yield_empty_set() {
        let bench = ScriptedBench::new(vec![]);
        let outcome = greedy_search(&bench, &catalog(&["-O2", "-O3"], &["-fa"]), |_| {});

        assert!(outcome.flags.is_empty());
        assert!(outcome.all_failed());
        assert_eq!(outcome.trials.len(), 3);
        assert!(outcome.trials.iter().all(|t| !t.accepted));
    }

    #[test]
    fn test_failed_seed_recovers_on_later_level() {
        // First level fails to build entirely; a later success still seeds.
        let bench = ScriptedBench::new(vec![("-O1", 7.0)]);
        let outcome = greedy_search(&bench, &catalog(&["-Ofast", "-O1"], &[]), |_| {});

        assert_eq!(outcome.flags.joined(), "-O1");
        assert_eq!(outcome.time, Measurement::Seconds(7.0));
    }

    #[test]
    fn test_on_trial_sees_every_candidate_in_order() {
        let bench = ScriptedBench::new(vec![("-O2", 5.0), ("-O2 -fa", 4.0)]);
        let mut seen = Vec::new();
        greedy_search(&bench, &catalog(&["-O2"], &["-fa"]), |t| {
            seen.push((t.candidate.clone(), t.accepted));
        });

        assert_eq!(
            seen,
            vec![("-O2".to_string(), true), ("-fa".to_string(), true)]
        );
    }
}
