//! Core infrastructure for tsgraph.
//!
//! This crate provides the language-agnostic half of the indexer:
//! - Graph model: ids, name hierarchies, source ranges, record tables
//! - Store write API with in-memory and JSON file backends
//! - File registry and source range mapping
//! - Comment folding into atomic ranges
//! - Symbol and reference recording with upsert semantics
//! - Module/package symbols derived from paths
//! - Library reference directives and diagnostics
//! - The persistence session that owns transaction boundaries
//! - Error types, index options and JSON output types

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod library;
pub mod output;
pub mod registry;
pub mod session;
pub mod store;
pub mod text;
pub mod trivia;
pub mod writer;
