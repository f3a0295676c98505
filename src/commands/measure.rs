//! Measure command handler - one-shot trial of an explicit flag set

use crate::cli::{MeasureArgs, OutputFormat};
use crate::commands::{build_benchmark, CommandContext};
use crate::error::Result;
use crate::flags::FlagSet;
use crate::measure::Benchmark;

/// Run the measure command
pub fn run_measure(args: &MeasureArgs, ctx: &CommandContext) -> Result<String> {
    let bench = build_benchmark(&args.build)?;
    let flags = FlagSet::from(args.flags.clone());

    if ctx.verbose {
        eprintln!(
            "Measuring {} with flags: {}",
            bench.project_dir().display(),
            if flags.is_empty() {
                "(none)".to_string()
            } else {
                flags.joined()
            }
        );
    }

    let measurement = bench.measure(&flags);

    let output = match ctx.format {
        OutputFormat::Json => {
            let json_value = serde_json::json!({
                "_type": "measure_report",
                "project": bench.project_dir().to_string_lossy(),
                "jobs": bench.jobs(),
                "runs": bench.runs(),
                "flags": flags.as_slice(),
                "time_s": measurement.as_seconds(),
            });
            serde_json::to_string_pretty(&json_value).unwrap_or_default()
        }
        OutputFormat::Text => {
            let mut output = String::new();
            if flags.is_empty() {
                output.push_str("flags: (none)\n");
            } else {
                output.push_str(&format!("flags: {}\n", flags.joined()));
            }
            output.push_str(&format!("time: {}\n", measurement));
            output
        }
    };

    Ok(output)
}
