//! tsgraph - TypeScript symbol graph indexer.
//!
//! This crate provides the CLI binary and its command helpers.
//!
//! ## Modules
//!
//! - `cli` - Index command implementations shared by the binary and tests

pub mod cli;

// Re-export core types for convenience
pub use tsgraph_core::config::{CliOverrides, IndexOptions};
pub use tsgraph_core::error::{IndexError, IndexResult, OutputErrorCode};
pub use tsgraph_core::output::{ErrorResponse, IndexResponse, SCHEMA_VERSION};
pub use tsgraph_typescript::{ConfigError, Program, ProjectConfig};
