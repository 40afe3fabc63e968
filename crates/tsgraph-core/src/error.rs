//! Error types and error code constants for tsgraph.
//!
//! [`IndexError`] is the single error type surfaced by an indexing session
//! and rendered by the CLI. It has three fatal families:
//!
//! - **Config resolution**: the project or file to index could not be
//!   resolved; raised before any store is opened
//! - **Store I/O**: open, close, transaction or optimize failed
//! - **Record**: a single record call failed; carries which record and the
//!   hierarchy, edge or id it was about
//!
//! Diagnostics produced by the front-end are data, not errors; see
//! `diagnostics.rs`.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments
//! - `3`: Diagnostics present (config resolution failed)
//! - `4`: Store failure (I/O or record)
//! - `10`: Internal errors

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes used as CLI exit codes and in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Configuration could not be resolved; diagnostics were printed.
    DiagnosticsPresent = 3,
    /// The store could not be opened, written or committed.
    StoreError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Record Kinds
// ============================================================================

/// Which record call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    File,
    FileLanguage,
    Symbol,
    SymbolKind,
    DefinitionKind,
    SymbolLocation,
    ScopeLocation,
    SignatureLocation,
    Reference,
    ReferenceLocation,
    Error,
    AtomicRange,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::File => "file",
            RecordKind::FileLanguage => "file language",
            RecordKind::Symbol => "symbol",
            RecordKind::SymbolKind => "symbol kind",
            RecordKind::DefinitionKind => "definition kind",
            RecordKind::SymbolLocation => "symbol location",
            RecordKind::ScopeLocation => "scope location",
            RecordKind::SignatureLocation => "signature location",
            RecordKind::Reference => "reference",
            RecordKind::ReferenceLocation => "reference location",
            RecordKind::Error => "error",
            RecordKind::AtomicRange => "atomic source range",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for an indexing run.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The project or file could not be resolved.
    #[error("{message}")]
    ConfigResolution {
        message: String,
        diagnostics: Vec<String>,
    },

    /// A store lifecycle operation failed.
    #[error("store {operation} failed: {source}")]
    StoreIo {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A single record call failed.
    #[error("failed to record {kind} for {target}: {source}")]
    Record {
        kind: RecordKind,
        target: String,
        #[source]
        source: StoreError,
    },

    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Result type for indexing operations.
pub type IndexResult<T> = Result<T, IndexError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&IndexError> for OutputErrorCode {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::ConfigResolution { .. } => OutputErrorCode::DiagnosticsPresent,
            IndexError::StoreIo { .. } => OutputErrorCode::StoreError,
            IndexError::Record { .. } => OutputErrorCode::StoreError,
            IndexError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            IndexError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl IndexError {
    /// Create a config resolution error with its diagnostic lines.
    pub fn config(message: impl Into<String>, diagnostics: Vec<String>) -> Self {
        IndexError::ConfigResolution {
            message: message.into(),
            diagnostics,
        }
    }

    /// Wrap a failed store lifecycle operation.
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        IndexError::StoreIo { operation, source }
    }

    /// Wrap a failed record call.
    pub fn record(kind: RecordKind, target: impl fmt::Display, source: StoreError) -> Self {
        IndexError::Record {
            kind,
            target: target.to_string(),
            source,
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        IndexError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        IndexError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Diagnostic lines to print, if any.
    pub fn diagnostics(&self) -> &[String] {
        match self {
            IndexError::ConfigResolution { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn test_config_resolution_maps_to_diagnostics_present() {
            let err = IndexError::config(
                "cannot find tsconfig.json",
                vec!["error: no tsconfig.json in /w".to_string()],
            );
            assert_eq!(err.error_code(), OutputErrorCode::DiagnosticsPresent);
            assert_eq!(err.error_code().code(), 3);
            assert_eq!(err.diagnostics().len(), 1);
        }

        #[test]
        fn test_store_io_maps_to_store_error() {
            let err = IndexError::store("open", StoreError::NotOpen);
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn test_record_maps_to_store_error() {
            let err = IndexError::record(RecordKind::SymbolKind, "A.b", StoreError::NotOpen);
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::StoreError);
        }

        #[test]
        fn test_internal_maps_to_internal_error() {
            let err = IndexError::internal("unexpected state");
            assert_eq!(err.error_code().code(), 10);
            assert!(err.diagnostics().is_empty());
        }

        #[test]
        fn test_invalid_arguments_maps_to_invalid_arguments() {
            let err = IndexError::invalid_args("bad flag");
            assert_eq!(err.error_code().code(), 2);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn test_record_error_names_kind_and_target() {
            let err = IndexError::record(
                RecordKind::ScopeLocation,
                "Outer.Inner",
                StoreError::NoTransaction,
            );
            let message = err.to_string();
            assert!(message.contains("scope location"));
            assert!(message.contains("Outer.Inner"));
        }

        #[test]
        fn test_store_error_names_operation() {
            let err = IndexError::store("commit", StoreError::NoTransaction);
            assert!(err.to_string().starts_with("store commit failed"));
        }
    }
}
