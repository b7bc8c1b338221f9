//! Use-case orchestration over the repo layer.
//!
//! # Responsibility
//! - Combine record store, snapshot cache, and model builder into the
//!   single build entry point consumed by UI shells.
//!
//! # Invariants
//! - Services stay storage- and transport-agnostic behind the repo
//!   contracts.

pub mod timeline_service;
