//! On-disk snapshot cache for the last full fetch.
//!
//! # Responsibility
//! - Persist the latest entry set with its source id and fetch stamp.
//! - Recover it on later runs so views can skip the network entirely.
//!
//! # Invariants
//! - Exactly one snapshot file exists; every save overwrites it, whatever
//!   the source id.
//! - A snapshot is only trusted when its stored `database_id` matches the
//!   requested one and its schema version is supported.
//! - No failure ever escapes: a bad load is a miss, a bad save is a no-op.

use crate::model::entry::Entry;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current snapshot wire format version.
const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Persisted snapshot file body.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    database_id: String,
    fetched_at: DateTime<Utc>,
    all_entries: Vec<Entry>,
    schema_version: u32,
}

/// Best-effort disk cache holding the latest fetched entry set.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached entry set when the snapshot exists and belongs to
    /// `database_id`.
    ///
    /// Every read/parse/shape failure is treated identically to "absent";
    /// nothing is ever surfaced as an error.
    pub fn load(&self, database_id: &str) -> Option<Vec<Entry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    "event=snapshot_miss module=repo status=ok path={} detail={}",
                    self.path.display(),
                    err
                );
                return None;
            }
        };

        let snapshot: SnapshotFile = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                debug!(
                    "event=snapshot_miss module=repo status=ok path={} detail=unparseable: {}",
                    self.path.display(),
                    err
                );
                return None;
            }
        };

        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            debug!(
                "event=snapshot_miss module=repo status=ok path={} detail=schema_version {} unsupported",
                self.path.display(),
                snapshot.schema_version
            );
            return None;
        }
        if snapshot.database_id != database_id {
            // A different source id never deletes the file; it simply is
            // not used.
            debug!(
                "event=snapshot_miss module=repo status=ok path={} detail=database_id mismatch",
                self.path.display()
            );
            return None;
        }

        info!(
            "event=snapshot_loaded module=repo status=ok database_id={} entries={} fetched_at={}",
            database_id,
            snapshot.all_entries.len(),
            snapshot.fetched_at.to_rfc3339()
        );
        Some(snapshot.all_entries)
    }

    /// Persists `all_entries` under `database_id`, overwriting any prior
    /// snapshot.
    ///
    /// Failures are logged and swallowed; the caller never aborts on a
    /// cache write.
    pub fn save(&self, database_id: &str, all_entries: &[Entry]) {
        let snapshot = SnapshotFile {
            database_id: database_id.to_string(),
            fetched_at: Utc::now(),
            all_entries: all_entries.to_vec(),
            schema_version: SNAPSHOT_SCHEMA_VERSION,
        };

        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    "event=snapshot_save_skipped module=repo status=error path={} detail={}",
                    self.path.display(),
                    err
                );
                return;
            }
        };

        match fs::write(&self.path, payload) {
            Ok(()) => info!(
                "event=snapshot_saved module=repo status=ok database_id={} entries={} path={}",
                database_id,
                all_entries.len(),
                self.path.display()
            ),
            Err(err) => warn!(
                "event=snapshot_save_skipped module=repo status=error path={} detail={}",
                self.path.display(),
                err
            ),
        }
    }
}
