use anyhow::Result;
use serde::Serialize;

use mailsift::{FilterSummary, Outcome};

use crate::args::OutputFormat;

#[derive(Debug, Serialize)]
pub struct Classified {
    pub address: String,
    pub outcome: Outcome,
}

pub fn print_classified(results: &[Classified], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for r in results {
                if r.outcome.is_deliverable() {
                    println!("[OK]      {}", r.address);
                } else {
                    println!("[SKIP]    {} :: {}", r.address, r.outcome);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(results)?),
        OutputFormat::Ndjson => {
            for r in results {
                println!("{}", serde_json::to_string(r)?);
            }
        }
    }
    Ok(())
}

pub fn print_summary(summary: &FilterSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("Processing complete.");
            println!("Total rows:        {}", summary.total_rows);
            println!("Deliverable rows:  {}", summary.deliverable_rows);
            println!("Skipped rows:      {}", summary.skipped_rows);
            println!(
                "Addresses:         {} valid syntax, {} with MX, {} deliverable, {} failed",
                summary.stats.valid_syntax,
                summary.stats.has_mx,
                summary.stats.deliverable,
                summary.stats.failed
            );
            if !summary.stats.failure_reasons.is_empty() {
                println!("Failure breakdown:");
                for (reason, count) in &summary.stats.failure_reasons {
                    println!("  {reason}: {count}");
                }
            }
            println!("Filtered file: {}", summary.output_path.display());
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }
    Ok(())
}
