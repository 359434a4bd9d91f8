//! Batch filtering: CSV rows in, deliverable rows out, with checkpointing.

mod checkpoint;
mod row;
mod run;
mod stats;

pub use checkpoint::{
    Checkpoint, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore, checkpoint_key,
};
pub use row::{Row, RowSet};
pub use run::{
    FilterConfig, FilterSummary, ProgressSink, TracingProgress, default_output_path, run_filter,
};
pub use stats::RunStats;

use std::path::{Path, PathBuf};

use crate::classify::{Classifier, SmtpProber};
use crate::error::FilterError;
use crate::mx::public_resolver;

/// Convenience driver wiring the live resolver, prober, and file-backed
/// checkpoint store together for one input file. This is what the CLI calls.
pub fn filter_file(
    input: &Path,
    output: Option<&Path>,
    checkpoint_dir: &Path,
    config: &FilterConfig,
) -> Result<FilterSummary, FilterError> {
    let rows = RowSet::from_path(input)?;
    let resolver = public_resolver()?;
    let classifier = Classifier::new(
        resolver,
        SmtpProber::default(),
        config.sender.clone(),
        config.probe_enabled,
    );
    let store = FileCheckpointStore::new(checkpoint_dir);
    let key = checkpoint_key(input);
    let out: PathBuf = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    run_filter(
        &rows,
        &out,
        &classifier,
        &store,
        &key,
        config,
        &mut TracingProgress,
    )
}
