//! Tune command handler - greedy flag search plus final build

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::cli::{OutputFormat, TuneArgs};
use crate::commands::{build_benchmark, load_catalog, CommandContext};
use crate::error::Result;
use crate::search::{greedy_search, SearchOutcome, Trial};

/// Run the tune command
pub fn run_tune(args: &TuneArgs, ctx: &CommandContext) -> Result<String> {
    let bench = build_benchmark(&args.build)?;
    let catalog = load_catalog(args.catalog.as_deref())?;

    if ctx.verbose {
        eprintln!(
            "Tuning {} ({} trials, {} jobs, {} runs per trial, check: {:?})",
            bench.project_dir().display(),
            catalog.trial_count(),
            bench.jobs(),
            bench.runs(),
            args.build.check_command,
        );
    }

    let total = catalog.trial_count();
    let pb = (ctx.progress && ctx.format == OutputFormat::Text).then(|| trial_bar(total));

    let emit = |line: String| match ctx.format {
        OutputFormat::Text => match &pb {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        },
        // Keep stdout machine-readable; trial lines go to stderr if asked for.
        OutputFormat::Json => {
            if ctx.verbose {
                eprintln!("{}", line);
            }
        }
    };

    let mut index = 0usize;
    let outcome = greedy_search(&bench, &catalog, |trial| {
        index += 1;
        emit(trial_line(index, total, trial));
        if trial.accepted {
            emit(format!(
                "*** best so far: {} ({})",
                trial.flags.joined(),
                trial.measurement
            ));
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    });

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if outcome.all_failed() {
        warn!("every trial failed; no flag combination was validated");
        eprintln!(
            "Warning: no flag set produced a successful measurement; \
             the final build will run with empty flags."
        );
    }

    let final_build = !args.skip_final_build;
    if final_build {
        emit(format!(
            "Final build with flags: {}",
            if outcome.flags.is_empty() {
                "(none)".to_string()
            } else {
                outcome.flags.joined()
            }
        ));
        bench.final_build(&outcome.flags)?;
    }

    Ok(render_report(&bench, &outcome, final_build, ctx))
}

fn trial_line(index: usize, total: usize, trial: &Trial) -> String {
    format!(
        "[{}/{}] {} {} ... {}",
        index,
        total,
        trial.phase.as_str(),
        trial.candidate,
        trial.measurement
    )
}

fn trial_bar(total: usize) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(total as u64).with_style(style)
}

fn render_report(
    bench: &crate::measure::MakeBenchmark,
    outcome: &SearchOutcome,
    final_build: bool,
    ctx: &CommandContext,
) -> String {
    match ctx.format {
        OutputFormat::Json => {
            let json_value = serde_json::json!({
                "_type": "tune_report",
                "project": bench.project_dir().to_string_lossy(),
                "jobs": bench.jobs(),
                "runs": bench.runs(),
                "best_flags": outcome.flags.as_slice(),
                "best_time_s": outcome.time.as_seconds(),
                "trials": outcome.trials,
                "final_build": final_build,
            });
            serde_json::to_string_pretty(&json_value).unwrap_or_default()
        }
        OutputFormat::Text => {
            let mut output = String::new();

            output.push_str("═══════════════════════════════════════════\n");
            output.push_str("  TUNING RESULT\n");
            output.push_str("═══════════════════════════════════════════\n\n");

            output.push_str(&format!("project: {}\n", bench.project_dir().display()));
            output.push_str(&format!("trials: {}\n", outcome.trials.len()));

            if outcome.flags.is_empty() {
                output.push_str("accepted flags: (none)\n");
            } else {
                output.push_str(&format!("accepted flags: {}\n", outcome.flags.joined()));
            }
            output.push_str(&format!("best time: {}\n", outcome.time));

            if final_build {
                output.push_str(
                    "\nFinal build complete with the tuned flags. \
                     You can now run 'make install' to install the optimized binary.\n",
                );
            }

            output
        }
    }
}
