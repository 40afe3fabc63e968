//! Diagnostics recorder.
//!
//! Front-end diagnostics are data: each one bound to a file is flattened to
//! a single message and persisted as an error record. A diagnostic with no
//! file cannot be navigated to, so it is only logged.

use std::fmt;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{IndexError, IndexResult, RecordKind};
use crate::text::{to_range, Point};
use crate::writer::GraphWriter;

/// Message of a diagnostic: plain text or a chain of parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessage {
    Text(String),
    /// Outer message first; parts are joined with newlines.
    Chain(Vec<String>),
}

impl DiagnosticMessage {
    pub fn flatten(&self) -> String {
        match self {
            DiagnosticMessage::Text(text) => text.clone(),
            DiagnosticMessage::Chain(parts) => parts.join("\n"),
        }
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// One diagnostic, with zero-based positions in its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<PathBuf>,
    pub message: DiagnosticMessage,
    pub start: Point,
    pub end: Point,
    pub fatal: bool,
}

impl Diagnostic {
    /// A diagnostic not tied to any file.
    pub fn unbound(message: impl Into<String>, fatal: bool) -> Self {
        Diagnostic {
            file: None,
            message: DiagnosticMessage::Text(message.into()),
            start: Point::default(),
            end: Point::default(),
            fatal,
        }
    }
}

/// Persist one diagnostic. Returns whether a record was written.
pub fn record_diagnostic(
    writer: &mut GraphWriter<'_>,
    diagnostic: &Diagnostic,
) -> IndexResult<bool> {
    let message = diagnostic.message.flatten();
    let Some(path) = &diagnostic.file else {
        warn!("diagnostic without file: {}", message);
        writer.stats_mut().unbound_diagnostics += 1;
        return Ok(false);
    };
    let file_id = writer.get_or_create_file(path)?;
    let range = to_range(file_id, diagnostic.start, diagnostic.end);
    writer
        .store()
        .record_error(&message, diagnostic.fatal, &range)
        .map_err(|e| IndexError::record(RecordKind::Error, range, e))?;
    writer.stats_mut().diagnostics += 1;
    Ok(true)
}

// ============================================================================
// Tests
// ============================================================================
