//! JSON output types for CLI responses.
//!
//! Every command prints exactly one JSON object on stdout:
//! - success: [`IndexResponse`] with `status: "ok"`
//! - failure: [`ErrorResponse`] with `status: "error"`
//!
//! Both carry [`SCHEMA_VERSION`]. Logs go to stderr and never mix in.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, OutputErrorCode};
use crate::writer::IndexStats;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Response of a successful indexing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Store the graph was committed to.
    pub store: String,
    /// Whether the store was cleared first.
    pub cleared: bool,
    pub files: usize,
    pub symbols: usize,
    pub references: usize,
    pub diagnostics: usize,
    pub unbound_diagnostics: usize,
    pub atomic_ranges: usize,
}

impl IndexResponse {
    pub fn new(store: impl Into<String>, cleared: bool, stats: &IndexStats) -> Self {
        IndexResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            store: store.into(),
            cleared,
            files: stats.files,
            symbols: stats.symbols,
            references: stats.references,
            diagnostics: stats.diagnostics,
            unbound_diagnostics: stats.unbound_diagnostics,
            atomic_ranges: stats.atomic_ranges,
        }
    }
}

/// Error information inside an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Diagnostic lines, for config resolution failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl ErrorInfo {
    pub fn from_error(err: &IndexError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            diagnostics: err.diagnostics().to_vec(),
        }
    }
}

/// Response of a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from an IndexError.
    pub fn from_error(err: &IndexError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
///
/// The output is deterministic: same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
