//! Timeline build orchestration.
//!
//! # Responsibility
//! - Decide, per request, between the in-memory model, the disk snapshot,
//!   and a fresh fetch.
//! - Own model memoization and its invalidation explicitly.
//!
//! # Invariants
//! - `force_refresh` never serves a stale model: the memo entry is
//!   invalidated before the rebuild.
//! - Building never fails; fetch problems surface as an empty model.
//! - A fresh fetch is always persisted to the snapshot before the model
//!   is returned.

use crate::model::timeline::{build_model_from_entries, TimelineModel};
use crate::repo::record_store::{fetch_all_entries, RecordStore};
use crate::repo::snapshot::SnapshotCache;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Memo key: source id plus the refresh epoch it was built under.
type ModelKey = (String, u64);

/// Orchestrates snapshot reuse, fresh fetches, and model memoization for
/// one record store.
pub struct TimelineService<S: RecordStore> {
    store: S,
    cache: SnapshotCache,
    built_models: BTreeMap<ModelKey, Arc<TimelineModel>>,
    refresh_epoch: u64,
}

impl<S: RecordStore> TimelineService<S> {
    pub fn new(store: S, cache: SnapshotCache) -> Self {
        Self {
            store,
            cache,
            built_models: BTreeMap::new(),
            refresh_epoch: 0,
        }
    }

    /// Returns the timeline model for `database_id`.
    ///
    /// # Contract
    /// - `force_refresh = false`: reuse the memoized model, else the disk
    ///   snapshot, else fetch fresh.
    /// - `force_refresh = true`: drop the live memo entry, bump the
    ///   refresh epoch, fetch fresh (bypassing the snapshot), persist the
    ///   result, rebuild.
    /// - Never fails: a failed fetch yields an empty (but valid) model.
    pub fn build_timeline_model(
        &mut self,
        database_id: &str,
        force_refresh: bool,
    ) -> Arc<TimelineModel> {
        if force_refresh {
            self.built_models
                .remove(&(database_id.to_string(), self.refresh_epoch));
            self.refresh_epoch += 1;
        }

        let key = (database_id.to_string(), self.refresh_epoch);
        if let Some(model) = self.built_models.get(&key) {
            return Arc::clone(model);
        }

        let entries = if force_refresh {
            None
        } else {
            self.cache.load(database_id)
        };

        let entries = match entries {
            Some(entries) => entries,
            None => {
                let fetched = fetch_all_entries(&self.store, database_id);
                // Persist even an empty fetch; the snapshot mirrors the
                // last attempt, not the last success.
                self.cache.save(database_id, &fetched);
                fetched
            }
        };

        let model = Arc::new(build_model_from_entries(&entries));
        info!(
            "event=model_built module=service status=ok database_id={} epoch={} chapters={} asides={} entries={} dropped={}",
            database_id,
            self.refresh_epoch,
            model.chapters.len(),
            model.aside_chapters.len(),
            model.entry_count,
            model.dropped_entry_count
        );
        self.built_models.insert(key, Arc::clone(&model));
        model
    }

    /// Current refresh epoch; bumped once per forced refresh.
    pub fn refresh_epoch(&self) -> u64 {
        self.refresh_epoch
    }

    /// Snapshot cache this service persists through.
    pub fn snapshot_cache(&self) -> &SnapshotCache {
        &self.cache
    }
}
