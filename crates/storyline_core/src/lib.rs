//! Core model-building logic for the Storyline timeline viewer.
//! This crate is the single source of truth for timeline invariants.

pub mod config;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ConfigResult, TimelineConfig};
pub use graph::flowchart::{chapter_flowchart, dot_flowchart, plain_list};
pub use logging::{default_log_level, init_logging};
pub use model::entry::{
    extract_property_value, resolved_title, Entry, EntryId, Property, PropertyBag, PropertyValue,
    RelationRef, SelectOption, TextRun, FALLBACK_TITLE,
};
pub use model::node::{parse_entries_to_nodes, EventNode, NodeMap};
pub use model::timeline::{
    build_model_from_entries, is_aside_chapter, is_main_chapter, TimelineModel,
    ASIDE_CHAPTER_PREFIX, MAIN_CHAPTER_PREFIX, PROLOGUE_LABEL,
};
pub use repo::record_store::{
    fetch_all_entries, QueryPage, RecordStore, RecordStoreError, StaticRecordStore, StoreResult,
};
pub use repo::snapshot::SnapshotCache;
pub use service::timeline_service::TimelineService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
