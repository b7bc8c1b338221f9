//! Event node graph projection.
//!
//! # Responsibility
//! - Project raw entries into graph-ready event nodes.
//! - Resolve forward/backward links from relation properties.
//!
//! # Invariants
//! - Nodes are never mutated after construction; rebuilds replace them.
//! - Link ids may point outside the current node set (cross-chapter links);
//!   consumers treat unresolved references as non-edges, not errors.

use crate::model::entry::{
    resolved_title, Entry, EntryId, PROP_CHAPTER_HEADING, PROP_NEXT_EVENT, PROP_PRIOR_EVENT,
    PROP_URL,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node map keyed by the originating entry id.
pub type NodeMap = BTreeMap<EntryId, EventNode>;

/// Graph-ready representation of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNode {
    /// Mirrors the raw entry id.
    pub id: EntryId,
    /// Resolved display title, never empty.
    pub title: String,
    /// External link, possibly empty.
    pub url: String,
    /// Whether the entry is flagged as its chapter's heading.
    pub is_chapter_heading: bool,
    /// Forward links, in source order.
    pub next_events: Vec<EntryId>,
    /// Backward links, in source order.
    pub prior_events: Vec<EntryId>,
}

/// Projects entries into a node map.
///
/// Chapter-agnostic: callers pass a chapter-scoped slice or the full set.
/// No topological ordering, cycle detection, or link-target validation
/// happens here; dangling and cyclic links are preserved as-is.
pub fn parse_entries_to_nodes(entries: &[Entry]) -> NodeMap {
    let mut nodes = NodeMap::new();

    for entry in entries {
        let node = EventNode {
            id: entry.id.clone(),
            title: resolved_title(&entry.properties),
            url: entry.property(PROP_URL).into_text(),
            is_chapter_heading: entry.property(PROP_CHAPTER_HEADING).is_truthy(),
            next_events: entry.property(PROP_NEXT_EVENT).into_ids(),
            prior_events: entry.property(PROP_PRIOR_EVENT).into_ids(),
        };
        nodes.insert(entry.id.clone(), node);
    }

    nodes
}
