//! Graphviz DOT generation for chapter node graphs.
//!
//! # Responsibility
//! - Describe one chapter's node map as a DOT digraph: one node per
//!   event, one edge per resolvable forward link.
//! - Rewrite aside-outlink nodes into in-app chapter navigation.
//! - Provide the plain-list fallback rendering.
//!
//! # Invariants
//! - Unresolvable link targets produce no edge, never an error.
//! - Record ids never leak into the DOT output; nodes are renumbered
//!   `node_0..node_N` in node-map iteration order.

use crate::model::entry::{Entry, EntryId, PROP_ASIDE_HEADING};
use crate::model::node::NodeMap;
use crate::model::timeline::{is_aside_chapter, TimelineModel};
use std::collections::{BTreeMap, BTreeSet};

const LABEL_WRAP_COLUMNS: usize = 30;
const COMPACT_GRAPH_MAX_NODES: usize = 5;

const HEADING_FILL: &str = "#f5f5f5";
const EVENT_FILL: &str = "#ffffff";
const EDGE_COLOR: &str = "#666666";
const FONT_COLOR: &str = "black";

/// Marker prefixed to nodes whose link was rewritten to in-app
/// navigation.
const INTERNAL_LINK_MARKER: &str = "\u{1F517} ";

/// Renders `chapter`'s graph from a built model, wiring in the entries
/// and aside-heading context the rewrite rules need.
pub fn chapter_flowchart(model: &TimelineModel, chapter: &str) -> String {
    dot_flowchart(
        model.nodes_for_chapter(chapter),
        chapter,
        model.entries_for_chapter(chapter),
        &model.aside_headings_for_chapter(chapter),
    )
}

/// Renders a node map as a DOT digraph.
///
/// `entries` are the raw records behind `nodes` (used to spot
/// aside-outlink flags); `aside_headings` maps each related aside label
/// to its chapter-heading titles. A node counts as an aside-outlink when
/// its record is flagged and it carries a url; when its title also
/// appears in an aside's heading set, its link becomes
/// `?chapter=<aside>` instead of the original url.
pub fn dot_flowchart(
    nodes: &NodeMap,
    chapter_name: &str,
    entries: &[Entry],
    aside_headings: &BTreeMap<String, BTreeSet<String>>,
) -> String {
    let display_ids: BTreeMap<&EntryId, String> = nodes
        .keys()
        .enumerate()
        .map(|(index, id)| (id, format!("node_{index}")))
        .collect();

    let outlink_flagged: BTreeSet<&str> = entries
        .iter()
        .filter(|entry| entry.property(PROP_ASIDE_HEADING).is_truthy())
        .map(|entry| entry.id.as_str())
        .collect();

    let compact = nodes.len() <= COMPACT_GRAPH_MAX_NODES || is_aside_chapter(chapter_name);
    let base_font_size = if compact { 12 } else { 11 };
    let heading_font_size = base_font_size + 2;

    let mut lines = vec![format!("digraph {} {{", graph_name(chapter_name))];
    lines.push("    rankdir=TB;".to_string());
    if compact {
        lines.push(format!(
            "    node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\", fontsize={base_font_size}, width=3, height=1.2, margin=0.2];"
        ));
        lines.push(
            "    graph [bgcolor=transparent, nodesep=0.5, ranksep=0.8, size=\"10,8!\", ratio=fill];"
                .to_string(),
        );
    } else {
        lines.push(format!(
            "    node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\", fontsize={base_font_size}, margin=0.2];"
        ));
        lines.push(
            "    graph [bgcolor=transparent, nodesep=0.3, ranksep=0.5, ratio=auto, margin=0.2];"
                .to_string(),
        );
    }
    lines.push(format!(
        "    edge [color=\"{EDGE_COLOR}\", penwidth=1, arrowsize=0.6];"
    ));
    lines.push(String::new());

    for (id, node) in nodes {
        let display_id = &display_ids[id];
        let wrapped = wrap_words(&node.title, LABEL_WRAP_COLUMNS);
        let tooltip = escape_dot_string(&wrapped.join(" "));

        let is_outlink = outlink_flagged.contains(id.as_str()) && !node.url.is_empty();
        let href = if is_outlink {
            find_aside_for_title(&node.title, aside_headings)
                .map(|aside| format!("?chapter={}", aside.replace(' ', "%20")))
                .unwrap_or_else(|| node.url.clone())
        } else {
            node.url.clone()
        };

        let mut label = escape_dot_string(&wrapped.join("\n"));
        if is_outlink {
            label = format!("{INTERNAL_LINK_MARKER}{label}");
        }

        let link_attrs = if href.is_empty() {
            String::new()
        } else {
            let target = if is_outlink { "_self" } else { "_blank" };
            format!(", href=\"{}\", target=\"{target}\"", escape_dot_string(&href))
        };

        if node.is_chapter_heading {
            lines.push(format!(
                "    {display_id} [label=\"{label}\", fillcolor=\"{HEADING_FILL}\", fontcolor={FONT_COLOR}, penwidth=1, fontsize={heading_font_size}{link_attrs}, tooltip=\"{tooltip}\", color=\"#000000\", fontweight=\"bold\"];"
            ));
        } else {
            lines.push(format!(
                "    {display_id} [label=\"{label}\", fillcolor=\"{EVENT_FILL}\", fontcolor={FONT_COLOR}, fontsize={base_font_size}{link_attrs}, tooltip=\"{tooltip}\", color=\"{EDGE_COLOR}\"];"
            ));
        }
    }

    lines.push(String::new());

    for (id, node) in nodes {
        let source = &display_ids[id];
        for next_id in &node.next_events {
            // Cross-chapter and dangling targets simply draw no edge.
            if let Some(target) = display_ids.get(next_id) {
                lines.push(format!("    {source} -> {target};"));
            }
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

/// Plain list rendering of a node map, used when DOT output cannot be
/// consumed and by the CLI's `--list` mode.
pub fn plain_list(nodes: &NodeMap) -> String {
    nodes
        .values()
        .map(|node| {
            if node.url.is_empty() {
                format!("\u{2022} {}", node.title)
            } else {
                format!("\u{2022} [{}]({})", node.title, node.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First aside (in sorted order) whose heading-title set contains
/// `title`.
fn find_aside_for_title<'a>(
    title: &str,
    aside_headings: &'a BTreeMap<String, BTreeSet<String>>,
) -> Option<&'a str> {
    aside_headings
        .iter()
        .find(|(_, titles)| titles.contains(title))
        .map(|(aside, _)| aside.as_str())
}

fn graph_name(chapter_name: &str) -> String {
    if chapter_name.is_empty() {
        return "timeline".to_string();
    }
    let sanitized: String = chapter_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("timeline_{sanitized}")
}

/// Greedy word wrap; words longer than `width` get their own line.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn escape_dot_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('\t', " ")
}
