//! External record store contract and fetch-to-exhaustion driver.
//!
//! # Responsibility
//! - Define the paginated `query` contract implemented by external-source
//!   adapters.
//! - Drive pagination to exhaustion and collapse any failure to an empty
//!   result set.
//!
//! # Invariants
//! - Pages are requested strictly in sequence; the next-cursor dependency
//!   forbids speculative fetches.
//! - A failed page aborts the whole fetch and yields zero entries, never a
//!   partial list.

use crate::model::entry::Entry;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default page size for the bundled in-memory store.
pub const DEFAULT_PAGE_SIZE: usize = 100;

pub type StoreResult<T> = Result<T, RecordStoreError>;

/// Failure surfaced by a record store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStoreError {
    /// The remote call itself failed (network, auth, availability).
    Transport(String),
    /// The response arrived but cannot be used as a page.
    MalformedResponse(String),
}

impl Display for RecordStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(detail) => write!(f, "record store transport failure: {detail}"),
            Self::MalformedResponse(detail) => {
                write!(f, "malformed record store response: {detail}")
            }
        }
    }
}

impl Error for RecordStoreError {}

/// One page of query results from the external database.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub results: Vec<Entry>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Paginated access to the external record database.
///
/// Adapters own authentication and transport; this crate only depends on
/// the page shape.
pub trait RecordStore {
    /// Fetches one page for `database_id`, continuing from `cursor` when
    /// present.
    fn query(&self, database_id: &str, cursor: Option<&str>) -> StoreResult<QueryPage>;
}

/// Fetches every entry for `database_id`, looping until `has_more` is
/// false.
///
/// # Contract
/// - Page order is preserved in the returned list.
/// - Any page failure is logged and collapses the whole fetch to an empty
///   vector; callers always receive a valid (possibly empty) list.
/// - `has_more` without a continuation cursor cannot advance and is
///   treated as a malformed response.
pub fn fetch_all_entries<S: RecordStore + ?Sized>(store: &S, database_id: &str) -> Vec<Entry> {
    let mut all_entries = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        let page = match store.query(database_id, cursor.as_deref()) {
            Ok(page) => page,
            Err(err) => {
                warn!(
                    "event=fetch_aborted module=repo status=error database_id={} pages_read={} detail={}",
                    database_id, page_count, err
                );
                return Vec::new();
            }
        };

        page_count += 1;
        all_entries.extend(page.results);

        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                warn!(
                    "event=fetch_aborted module=repo status=error database_id={} pages_read={} detail=has_more without next_cursor",
                    database_id, page_count
                );
                return Vec::new();
            }
        }
    }

    info!(
        "event=fetch_complete module=repo status=ok database_id={} pages={} entries={}",
        database_id,
        page_count,
        all_entries.len()
    );
    all_entries
}

/// Fixed-content record store that pages like a remote source.
///
/// Used by tests and demos to exercise the pagination contract without a
/// network; the cursor is the offset of the next page.
pub struct StaticRecordStore {
    entries: Vec<Entry>,
    page_size: usize,
}

impl StaticRecordStore {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self::with_page_size(entries, DEFAULT_PAGE_SIZE)
    }

    /// A `page_size` of zero is clamped to one so every query advances.
    pub fn with_page_size(entries: Vec<Entry>, page_size: usize) -> Self {
        Self {
            entries,
            page_size: page_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordStore for StaticRecordStore {
    fn query(&self, _database_id: &str, cursor: Option<&str>) -> StoreResult<QueryPage> {
        let start = match cursor {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                RecordStoreError::MalformedResponse(format!("invalid cursor `{raw}`"))
            })?,
            None => 0,
        };
        if start > self.entries.len() {
            return Err(RecordStoreError::MalformedResponse(format!(
                "cursor `{start}` is past the end of the store"
            )));
        }

        let end = start.saturating_add(self.page_size).min(self.entries.len());
        let has_more = end < self.entries.len();

        Ok(QueryPage {
            results: self.entries[start..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        fetch_all_entries, QueryPage, RecordStore, RecordStoreError, StaticRecordStore,
        StoreResult,
    };
    use crate::model::entry::Entry;

    fn entries(count: usize) -> Vec<Entry> {
        (0..count).map(|i| Entry::new(format!("rec-{i}"))).collect()
    }

    #[test]
    fn fetch_drives_pagination_to_exhaustion_in_order() {
        let store = StaticRecordStore::with_page_size(entries(7), 3);

        let fetched = fetch_all_entries(&store, "db-1");

        assert_eq!(fetched.len(), 7);
        let ids: Vec<&str> = fetched.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids[0], "rec-0");
        assert_eq!(ids[6], "rec-6");
    }

    #[test]
    fn fetch_of_empty_store_returns_empty() {
        let store = StaticRecordStore::new(Vec::new());
        assert!(fetch_all_entries(&store, "db-1").is_empty());
    }

    #[test]
    fn failed_page_collapses_fetch_to_empty() {
        struct FailsOnSecondPage;

        impl RecordStore for FailsOnSecondPage {
            fn query(&self, _database_id: &str, cursor: Option<&str>) -> StoreResult<QueryPage> {
                match cursor {
                    None => Ok(QueryPage {
                        results: vec![Entry::new("page-one")],
                        has_more: true,
                        next_cursor: Some("1".to_string()),
                    }),
                    Some(_) => Err(RecordStoreError::Transport("connection reset".to_string())),
                }
            }
        }

        // Never a partial result: the first page must not leak through.
        assert!(fetch_all_entries(&FailsOnSecondPage, "db-1").is_empty());
    }

    #[test]
    fn has_more_without_cursor_is_malformed_and_collapses_to_empty() {
        struct CursorlessStore;

        impl RecordStore for CursorlessStore {
            fn query(&self, _database_id: &str, _cursor: Option<&str>) -> StoreResult<QueryPage> {
                Ok(QueryPage {
                    results: vec![Entry::new("stuck")],
                    has_more: true,
                    next_cursor: None,
                })
            }
        }

        assert!(fetch_all_entries(&CursorlessStore, "db-1").is_empty());
    }

    #[test]
    fn static_store_rejects_garbage_cursor() {
        let store = StaticRecordStore::new(entries(1));
        let err = store.query("db-1", Some("not-a-number")).unwrap_err();
        assert!(matches!(err, RecordStoreError::MalformedResponse(_)));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let store = StaticRecordStore::with_page_size(entries(2), 0);
        assert_eq!(fetch_all_entries(&store, "db-1").len(), 2);
    }
}
