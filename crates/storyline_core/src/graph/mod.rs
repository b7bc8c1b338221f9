//! Diagram description generation.
//!
//! # Responsibility
//! - Turn built node graphs into renderable display artifacts (Graphviz
//!   DOT, plain lists).
//!
//! # Invariants
//! - Generation is pure string assembly over an immutable model; when a
//!   consumer cannot use the DOT artifact it falls back to `plain_list`
//!   over the same node map.

pub mod flowchart;
