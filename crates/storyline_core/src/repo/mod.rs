//! Data access boundary: external record store and local snapshot cache.
//!
//! # Responsibility
//! - Define the paginated query contract for the external database.
//! - Persist and recover the single on-disk entry snapshot.
//!
//! # Invariants
//! - Fetch failures collapse to empty results at this boundary; the model
//!   layer above never sees exceptional control flow.
//! - Snapshot I/O failures are swallowed after logging; the cache is a
//!   pure optimization.

pub mod record_store;
pub mod snapshot;
