//! The checkpointed filtering run.
//!
//! Single-threaded by design: one address, one network call in flight. The
//! run walks rows in order, classifies every address of a row, appends
//! surviving rows to the CSV output, and persists a checkpoint every
//! `checkpoint_interval` rows so an interrupted run can pick up where it
//! stopped. The checkpoint is deleted once the whole input is consumed.
//!
//! Row granularity: a row survives only when all of its addresses classify
//! as deliverable. A row whose `emails` cell is empty is classified as one
//! empty (hence syntactically invalid) address.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::checkpoint::{Checkpoint, CheckpointStore};
use super::row::RowSet;
use super::stats::RunStats;
use crate::classify::{Classifier, RecipientProbe};
use crate::error::FilterError;
use crate::mx::MxLookup;

/// Settings for one filtering run.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Envelope sender used by the SMTP probe.
    pub sender: String,
    /// Whether the RCPT probe stage runs at all.
    pub probe_enabled: bool,
    /// Rows between checkpoint writes.
    pub checkpoint_interval: usize,
    /// Resume from a prior checkpoint when one exists.
    pub resume: bool,
}

impl FilterConfig {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            probe_enabled: false,
            checkpoint_interval: 10,
            resume: false,
        }
    }
}

/// What a completed run reports back to the caller. Resumed runs include the
/// prior sessions' counts restored from the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilterSummary {
    pub total_rows: usize,
    pub deliverable_rows: u64,
    pub skipped_rows: u64,
    pub stats: RunStats,
    pub output_path: PathBuf,
}

/// Receives periodic progress snapshots, one per checkpoint write.
pub trait ProgressSink {
    fn on_progress(&mut self, rows_processed: usize, deliverable: u64, skipped: u64);
}

/// Default sink: progress goes to the log.
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&mut self, rows_processed: usize, deliverable: u64, skipped: u64) {
        info!(rows_processed, deliverable, skipped, "filter progress");
    }
}

/// Runs the filter over `rows`, writing surviving rows to `output_path`.
///
/// A fresh run truncates the output and writes the header; a resumed run
/// appends, adding the header only when the output is missing or empty.
pub fn run_filter<R, P, S, G>(
    rows: &RowSet,
    output_path: &Path,
    classifier: &Classifier<R, P>,
    store: &S,
    key: &str,
    config: &FilterConfig,
    progress: &mut G,
) -> Result<FilterSummary, FilterError>
where
    R: MxLookup,
    P: RecipientProbe,
    S: CheckpointStore + ?Sized,
    G: ProgressSink + ?Sized,
{
    let prior = if config.resume { store.load(key) } else { None };
    let prior = prior.unwrap_or_default();
    let start_row = prior.rows_processed.min(rows.len());
    if start_row > 0 {
        info!(key, start_row, "resuming from checkpoint");
    }

    let mut stats = prior.stats;
    let mut deliverable_rows = prior.deliverable_rows;
    let mut skipped_rows = prior.skipped_rows;

    let mut writer = open_output(output_path, start_row > 0, rows)?;
    let interval = config.checkpoint_interval.max(1);

    let mut processed = start_row;
    for row in rows.rows_from(start_row) {
        let addresses = rows.emails_of(row);
        let mut row_deliverable = !addresses.is_empty();
        if addresses.is_empty() {
            // Empty cell behaves like one empty address.
            stats.record(classifier.classify(""));
        }
        for address in addresses {
            let outcome = classifier.classify(address);
            stats.record(outcome);
            if !outcome.is_deliverable() {
                warn!(row = row.index, address, outcome = %outcome, "address skipped");
                row_deliverable = false;
            }
        }

        if row_deliverable {
            writer.write_record(&row.fields).map_err(FilterError::write)?;
            deliverable_rows += 1;
        } else {
            skipped_rows += 1;
        }
        processed = row.index + 1;

        if processed % interval == 0 {
            writer.flush().map_err(|err| FilterError::output(output_path, err))?;
            store.save(
                key,
                &Checkpoint {
                    rows_processed: processed,
                    deliverable_rows,
                    skipped_rows,
                    stats: stats.clone(),
                },
            )?;
            progress.on_progress(processed, deliverable_rows, skipped_rows);
        }
    }

    writer.flush().map_err(|err| FilterError::output(output_path, err))?;
    store.clear(key)?;
    info!(
        total_rows = rows.len(),
        deliverable_rows, skipped_rows, "filtering complete"
    );

    Ok(FilterSummary {
        total_rows: rows.len(),
        deliverable_rows,
        skipped_rows,
        stats,
        output_path: output_path.to_path_buf(),
    })
}

/// Default output location for an input file: `filtered_<stem>.csv` next to
/// the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    input.with_file_name(format!("filtered_{stem}.csv"))
}

fn open_output(
    path: &Path,
    resuming: bool,
    rows: &RowSet,
) -> Result<csv::Writer<File>, FilterError> {
    let file = if resuming {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| FilterError::output(path, err))?
    } else {
        File::create(path).map_err(|err| FilterError::output(path, err))?
    };
    let need_header = !resuming
        || file
            .metadata()
            .map_err(|err| FilterError::output(path, err))?
            .len()
            == 0;
    let mut writer = csv::Writer::from_writer(file);
    if need_header {
        writer.write_record(rows.headers()).map_err(FilterError::write)?;
    }
    Ok(writer)
}
