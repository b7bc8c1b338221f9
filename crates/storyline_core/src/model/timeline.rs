//! Timeline model assembly.
//!
//! # Responsibility
//! - Group entries by chapter and order the main storyline.
//! - Discover aside chapters and infer the main-to-aside mapping by
//!   title intersection.
//! - Build per-chapter node graphs and assemble the immutable model.
//!
//! # Invariants
//! - The prologue label, when observed, is always first in the main list.
//! - A mapping entry between main M and aside A exists iff M's
//!   aside-outlink titles intersect A's chapter-heading titles.
//! - Rebuilding from the same entry list yields identical logical content;
//!   node-map iteration order is still not part of the contract.

use crate::model::entry::{
    resolved_title, Entry, Property, PROP_ASIDE_HEADING, PROP_CHAPTER, PROP_CHAPTER_HEADING,
};
use crate::model::node::{parse_entries_to_nodes, NodeMap};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Reserved label that always sorts first in the main storyline.
pub const PROLOGUE_LABEL: &str = "Prologue";
/// Label prefix identifying main chapters.
pub const MAIN_CHAPTER_PREFIX: &str = "Chapter";
/// Label prefix identifying aside chapters.
pub const ASIDE_CHAPTER_PREFIX: &str = "Aside";

static EMPTY_NODES: Lazy<NodeMap> = Lazy::new(NodeMap::new);

/// Returns whether `label` names a main chapter.
pub fn is_main_chapter(label: &str) -> bool {
    label == PROLOGUE_LABEL || label.starts_with(MAIN_CHAPTER_PREFIX)
}

/// Returns whether `label` names an aside chapter.
pub fn is_aside_chapter(label: &str) -> bool {
    label.starts_with(ASIDE_CHAPTER_PREFIX)
}

/// Complete, immutable result of one model build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineModel {
    /// Ordered main storyline: prologue first, then `Chapter*` labels sorted.
    pub chapters: Vec<String>,
    /// Sorted aside chapter labels.
    pub aside_chapters: Vec<String>,
    /// Raw entries per chapter label.
    pub entries_by_chapter: BTreeMap<String, Vec<Entry>>,
    /// Node graphs per chapter label.
    pub nodes_by_chapter: BTreeMap<String, NodeMap>,
    /// Main chapter label -> sorted aside labels it links into.
    pub chapter_aside_mapping: BTreeMap<String, Vec<String>>,
    /// Aside chapter label -> titles of its chapter-heading entries.
    pub headings_by_aside: BTreeMap<String, BTreeSet<String>>,
    /// Total number of input entries, for diagnostics.
    pub entry_count: usize,
    /// Entries dropped for lacking a resolvable chapter value.
    pub dropped_entry_count: usize,
}

impl TimelineModel {
    /// Node graph for `chapter`; unknown labels yield an empty map
    /// ("no events for this chapter"), never an error.
    pub fn nodes_for_chapter(&self, chapter: &str) -> &NodeMap {
        self.nodes_by_chapter
            .get(chapter)
            .unwrap_or(&EMPTY_NODES)
    }

    /// Raw entries for `chapter`; unknown labels yield an empty slice.
    pub fn entries_for_chapter(&self, chapter: &str) -> &[Entry] {
        self.entries_by_chapter
            .get(chapter)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Aside labels linked from `chapter`; empty when none are inferred.
    pub fn asides_for_chapter(&self, chapter: &str) -> &[String] {
        self.chapter_aside_mapping
            .get(chapter)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Chapter-heading titles of the asides linked from `chapter`, keyed
    /// by aside label. This is the rewrite context the diagram generator
    /// consumes.
    pub fn aside_headings_for_chapter(
        &self,
        chapter: &str,
    ) -> BTreeMap<String, BTreeSet<String>> {
        self.asides_for_chapter(chapter)
            .iter()
            .map(|aside| {
                let titles = self
                    .headings_by_aside
                    .get(aside)
                    .cloned()
                    .unwrap_or_default();
                (aside.clone(), titles)
            })
            .collect()
    }
}

/// Chapter label of one entry, read strictly from a `select`-typed
/// Chapter property. Anything else resolves to no chapter.
fn chapter_label(entry: &Entry) -> Option<String> {
    match entry.properties.get(PROP_CHAPTER) {
        Some(Property::Select {
            select: Some(option),
        }) if !option.name.is_empty() => Some(option.name.clone()),
        _ => None,
    }
}

/// Titles of `entries` whose `flag_property` is truthy.
fn flagged_titles(entries: &[Entry], flag_property: &str) -> BTreeSet<String> {
    entries
        .iter()
        .filter(|entry| entry.property(flag_property).is_truthy())
        .map(|entry| resolved_title(&entry.properties))
        .collect()
}

/// Builds the timeline model from the full entry list.
///
/// Pure function over its input: no I/O, no clock, no globals. Entries
/// without a chapter are dropped from every grouping; the model records
/// how many were dropped so callers can warn.
pub fn build_model_from_entries(all_entries: &[Entry]) -> TimelineModel {
    let mut entries_by_chapter: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    let mut dropped_entry_count = 0usize;

    for entry in all_entries {
        match chapter_label(entry) {
            Some(chapter) => entries_by_chapter
                .entry(chapter)
                .or_default()
                .push(entry.clone()),
            None => dropped_entry_count += 1,
        }
    }

    // Main ordering: prologue first, then `Chapter*` labels. BTreeMap keys
    // are already lexicographically sorted.
    let mut chapters = Vec::new();
    if entries_by_chapter.contains_key(PROLOGUE_LABEL) {
        chapters.push(PROLOGUE_LABEL.to_string());
    }
    chapters.extend(
        entries_by_chapter
            .keys()
            .filter(|label| label.starts_with(MAIN_CHAPTER_PREFIX))
            .cloned(),
    );

    let aside_chapters: Vec<String> = entries_by_chapter
        .keys()
        .filter(|label| is_aside_chapter(label))
        .cloned()
        .collect();

    let mut headings_by_aside = BTreeMap::new();
    for aside in &aside_chapters {
        let entries = entries_by_chapter.get(aside).map_or(&[][..], Vec::as_slice);
        headings_by_aside.insert(aside.clone(), flagged_titles(entries, PROP_CHAPTER_HEADING));
    }

    // The prologue never links out to asides.
    let mut outlinks_by_main: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for main in chapters.iter().filter(|label| *label != PROLOGUE_LABEL) {
        let entries = entries_by_chapter.get(main).map_or(&[][..], Vec::as_slice);
        let titles = flagged_titles(entries, PROP_ASIDE_HEADING);
        if !titles.is_empty() {
            outlinks_by_main.insert(main.clone(), titles);
        }
    }

    let mut chapter_aside_mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (main, outlink_titles) in &outlinks_by_main {
        for (aside, heading_titles) in &headings_by_aside {
            if !outlink_titles.is_disjoint(heading_titles) {
                chapter_aside_mapping
                    .entry(main.clone())
                    .or_default()
                    .push(aside.clone());
            }
        }
    }

    let mut nodes_by_chapter = BTreeMap::new();
    for chapter in chapters.iter().chain(aside_chapters.iter()) {
        let entries = entries_by_chapter
            .get(chapter)
            .map_or(&[][..], Vec::as_slice);
        nodes_by_chapter.insert(chapter.clone(), parse_entries_to_nodes(entries));
    }

    TimelineModel {
        chapters,
        aside_chapters,
        entries_by_chapter,
        nodes_by_chapter,
        chapter_aside_mapping,
        headings_by_aside,
        entry_count: all_entries.len(),
        dropped_entry_count,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_model_from_entries, is_aside_chapter, is_main_chapter, PROLOGUE_LABEL,
    };
    use crate::model::entry::{Entry, Property, SelectOption, TextRun, PROP_CHAPTER, PROP_NAME};

    fn chaptered_entry(id: &str, title: &str, chapter: &str) -> Entry {
        let mut entry = Entry::new(id);
        entry.properties.insert(
            PROP_NAME.to_string(),
            Property::Title {
                title: vec![TextRun::new(title)],
            },
        );
        entry.properties.insert(
            PROP_CHAPTER.to_string(),
            Property::Select {
                select: Some(SelectOption::new(chapter)),
            },
        );
        entry
    }

    #[test]
    fn prologue_sorts_first_regardless_of_input_order() {
        let entries = vec![
            chaptered_entry("1", "Two", "Chapter 2"),
            chaptered_entry("2", "One", "Chapter 1"),
            chaptered_entry("3", "Zero", PROLOGUE_LABEL),
        ];

        let model = build_model_from_entries(&entries);
        assert_eq!(model.chapters, vec!["Prologue", "Chapter 1", "Chapter 2"]);
    }

    #[test]
    fn chapterless_entries_are_dropped_but_counted() {
        let entries = vec![
            chaptered_entry("1", "Kept", "Chapter 1"),
            Entry::new("loose"),
        ];

        let model = build_model_from_entries(&entries);
        assert_eq!(model.entry_count, 2);
        assert_eq!(model.dropped_entry_count, 1);
        assert_eq!(model.entries_by_chapter["Chapter 1"].len(), 1);
        assert!(model
            .entries_by_chapter
            .values()
            .all(|chapter| chapter.iter().all(|entry| entry.id != "loose")));
    }

    #[test]
    fn unknown_chapter_yields_empty_nodes_not_an_error() {
        let model = build_model_from_entries(&[chaptered_entry("1", "A", "Chapter 1")]);
        assert!(model.nodes_for_chapter("Chapter 99").is_empty());
        assert!(model.entries_for_chapter("Chapter 99").is_empty());
        assert!(model.asides_for_chapter("Chapter 99").is_empty());
    }

    #[test]
    fn chapter_prefix_conventions() {
        assert!(is_main_chapter("Prologue"));
        assert!(is_main_chapter("Chapter 3"));
        assert!(!is_main_chapter("Aside 1"));
        assert!(is_aside_chapter("Aside 1 - Notes"));
        assert!(!is_aside_chapter("Chapter 1"));
    }
}
