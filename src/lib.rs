#![forbid(unsafe_code)]
//! mailsift — email deliverability filtering with checkpointed batch runs.
//!
//! The pipeline classifies an address in three short-circuiting stages:
//! syntax check, MX lookup, and an optional SMTP recipient probe. The batch
//! layer runs that pipeline over CSV rows, writes surviving rows to a
//! filtered output, and checkpoints progress so long runs survive
//! interruption.

pub mod batch;
pub mod classify;
pub mod error;
pub mod mx;
pub mod probe;
pub mod syntax;

pub use batch::{
    Checkpoint, CheckpointStore, FileCheckpointStore, FilterConfig, FilterSummary,
    MemoryCheckpointStore, ProgressSink, RowSet, RunStats, TracingProgress, checkpoint_key,
    default_output_path, filter_file, run_filter,
};
pub use classify::{Classifier, Outcome, RecipientProbe, SmtpProber};
pub use error::FilterError;
pub use mx::{MxLookup, MxRecord, MxStatus, RetryPolicy, has_mx_record, public_resolver};
pub use probe::{ProbeOptions, ProbeOutcome, SmtpReply, probe_recipient};
pub use syntax::{is_valid_syntax, split_domain};
