//! Text position utilities and the source range mapper.
//!
//! ## Coordinate Conventions
//!
//! - The front-end reports **0-indexed** lines and columns ([`Point`])
//! - The store uses **1-indexed** lines and columns ([`SourceRange`])
//! - Columns count bytes, not characters
//! - Byte offsets are **0-indexed**
//!
//! [`to_range`] is the single conversion between the two conventions. Both
//! the start and the end point are shifted by one, so an end point that the
//! front-end reports one past the last character stays one past it.

use crate::graph::{FileId, SourceRange};
use serde::{Deserialize, Serialize};

// ============================================================================
// Points and Spans
// ============================================================================

/// A zero-based line/column position as reported by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    pub line: usize,
    pub column: usize,
}

impl Point {
    pub fn new(line: usize, column: usize) -> Self {
        Point { line, column }
    }
}

/// A half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

// ============================================================================
// Source Range Mapper
// ============================================================================

/// Convert a zero-based `start..end` point pair into a store range.
///
/// Produces `(start.line+1, start.column+1)` to `(end.line+1, end.column+1)`.
pub fn to_range(file_id: FileId, start: Point, end: Point) -> SourceRange {
    SourceRange::new(
        file_id,
        (to_u32(start.line) + 1, to_u32(start.column) + 1),
        (to_u32(end.line) + 1, to_u32(end.column) + 1),
    )
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX - 1)
}

// ============================================================================
// Line Index
// ============================================================================

/// Precomputed line starts for byte offset to [`Point`] conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Index `text`. Lines end at `\n`; a preceding `\r` stays in the line.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines (an empty text has one empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based position of a byte offset. Offsets past the end clamp.
    pub fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Point::new(line, offset - self.line_starts[line])
    }

    /// Position one past the last byte.
    pub fn end_point(&self) -> Point {
        self.point(self.len)
    }

    /// Convert a byte span to a store range.
    pub fn range(&self, file_id: FileId, span: Span) -> SourceRange {
        to_range(file_id, self.point(span.start), self.point(span.end))
    }

    /// Range covering the whole text.
    pub fn full_range(&self, file_id: FileId) -> SourceRange {
        to_range(file_id, Point::default(), self.end_point())
    }
}

// ============================================================================
// Tests
// ============================================================================
