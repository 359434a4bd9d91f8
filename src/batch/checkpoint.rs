//! Durable progress markers for resumable filtering runs.
//!
//! The store is an explicit interface injected into the run, so tests can use
//! the in-memory implementation. The persisted record carries the exact
//! counters of the interrupted session next to the row offset; nothing is
//! reconstructed from output-file length on resume.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::stats::RunStats;
use crate::error::FilterError;

/// Progress snapshot persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Absolute count of fully processed input rows.
    pub rows_processed: usize,
    #[serde(default)]
    pub deliverable_rows: u64,
    #[serde(default)]
    pub skipped_rows: u64,
    #[serde(default)]
    pub stats: RunStats,
}

impl Checkpoint {
    pub fn at_row(rows_processed: usize) -> Self {
        Self {
            rows_processed,
            ..Self::default()
        }
    }
}

/// Key-value persistence for [`Checkpoint`] records, keyed by the input
/// artifact's identity.
pub trait CheckpointStore {
    fn save(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), FilterError>;
    /// Corrupt or unreadable content is treated as "no checkpoint".
    fn load(&self, key: &str) -> Option<Checkpoint>;
    fn clear(&self, key: &str) -> Result<(), FilterError>;
}

/// Derives the checkpoint key for an input file from its stem.
pub fn checkpoint_key(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

/// One JSON file per key under a base directory, written via
/// write-then-rename so a crash never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}_checkpoint.json"))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), FilterError> {
        fs::create_dir_all(&self.dir).map_err(FilterError::checkpoint)?;
        let path = self.path_for(key);
        let body = serde_json::to_vec(checkpoint)
            .map_err(|err| FilterError::checkpoint(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp).map_err(FilterError::checkpoint)?;
            file.write_all(&body).map_err(FilterError::checkpoint)?;
            file.sync_all().map_err(FilterError::checkpoint)?;
        }
        fs::rename(&tmp, &path).map_err(FilterError::checkpoint)?;
        debug!(key, rows = checkpoint.rows_processed, "checkpoint saved");
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Checkpoint> {
        let path = self.path_for(key);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(key, error = %err, "checkpoint unreadable, starting fresh");
                return None;
            }
        };
        match parse_checkpoint(&body) {
            Some(checkpoint) => Some(checkpoint),
            None => {
                warn!(key, "checkpoint corrupt, starting fresh");
                None
            }
        }
    }

    fn clear(&self, key: &str) -> Result<(), FilterError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(FilterError::checkpoint(err)),
        }
    }
}

/// Accepts the JSON record, or a legacy bare decimal row count.
fn parse_checkpoint(body: &str) -> Option<Checkpoint> {
    if let Ok(checkpoint) = serde_json::from_str::<Checkpoint>(body) {
        return Some(checkpoint);
    }
    body.trim()
        .parse::<usize>()
        .ok()
        .map(Checkpoint::at_row)
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<String, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, key: &str, checkpoint: &Checkpoint) -> Result<(), FilterError> {
        self.entries
            .lock()
            .expect("checkpoint map lock")
            .insert(key.to_string(), checkpoint.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Checkpoint> {
        self.entries
            .lock()
            .expect("checkpoint map lock")
            .get(key)
            .cloned()
    }

    fn clear(&self, key: &str) -> Result<(), FilterError> {
        self.entries
            .lock()
            .expect("checkpoint map lock")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCheckpointStore::new(dir.path());
        let mut checkpoint = Checkpoint::at_row(30);
        checkpoint.deliverable_rows = 12;

        store.save("input", &checkpoint).expect("save");
        assert_eq!(store.load("input"), Some(checkpoint.clone()));

        store.clear("input").expect("clear");
        assert_eq!(store.load("input"), None);
        // Clearing again stays a no-op.
        store.clear("input").expect("clear twice");
    }

    #[test]
    fn repeated_save_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCheckpointStore::new(dir.path());
        let checkpoint = Checkpoint::at_row(10);
        store.save("k", &checkpoint).expect("save");
        store.save("k", &checkpoint).expect("save again");
        assert_eq!(store.load("k").expect("loads").rows_processed, 10);
    }

    #[test]
    fn corrupt_content_loads_as_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCheckpointStore::new(dir.path());
        std::fs::write(dir.path().join("bad_checkpoint.json"), "not a number").expect("write");
        assert_eq!(store.load("bad"), None);
    }

    #[test]
    fn legacy_decimal_body_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCheckpointStore::new(dir.path());
        std::fs::write(dir.path().join("old_checkpoint.json"), "40\n").expect("write");
        let checkpoint = store.load("old").expect("legacy load");
        assert_eq!(checkpoint.rows_processed, 40);
        assert_eq!(checkpoint.stats, RunStats::default());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCheckpointStore::new(dir.path());
        assert_eq!(store.load("never-saved"), None);
    }

    #[test]
    fn key_derives_from_file_stem() {
        assert_eq!(checkpoint_key(Path::new("/tmp/contacts.csv")), "contacts");
        assert_eq!(checkpoint_key(Path::new("")), "input");
    }
}
