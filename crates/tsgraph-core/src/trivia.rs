//! Comment folding: groups leading comments into atomic ranges.
//!
//! A declaration's leading comments are folded into ranges that downstream
//! consumers must not subdivide:
//!
//! - every multi-line comment is its own range
//! - a run of two or more consecutive single-line comments is one range
//! - a lone single-line comment produces nothing
//! - `#region` / `#endregion` lines end the current run and belong to no range

use std::sync::LazyLock;

use regex::Regex;

use crate::text::Span;

static REGION_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//\s*#(?:end)?region\b").unwrap());

/// Kind of one trivia item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    /// `// ...`
    SingleLineComment,
    /// `/* ... */`
    MultiLineComment,
}

/// One leading comment of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriviaItem<'a> {
    pub kind: TriviaKind,
    pub span: Span,
    /// Source text of the comment.
    pub text: &'a str,
}

impl<'a> TriviaItem<'a> {
    pub fn new(kind: TriviaKind, span: Span, text: &'a str) -> Self {
        TriviaItem { kind, span, text }
    }
}

/// Whether a single-line comment opens or closes a foldable region.
pub fn is_region_delimiter(text: &str) -> bool {
    REGION_DELIMITER.is_match(text.trim_start())
}

/// Pending run of single-line comments.
#[derive(Debug, Default)]
struct Run {
    start: usize,
    end: usize,
    count: usize,
}

impl Run {
    fn flush(&mut self, out: &mut Vec<Span>) {
        if self.count > 1 {
            out.push(Span::new(self.start, self.end));
        }
        *self = Run::default();
    }
}

/// Fold an ordered list of leading trivia into atomic byte spans.
pub fn fold_comments(items: &[TriviaItem<'_>]) -> Vec<Span> {
    let mut out = Vec::new();
    let mut run = Run::default();
    for item in items {
        match item.kind {
            TriviaKind::MultiLineComment => {
                run.flush(&mut out);
                out.push(item.span);
            }
            TriviaKind::SingleLineComment if is_region_delimiter(item.text) => {
                run.flush(&mut out);
            }
            TriviaKind::SingleLineComment => {
                if run.count == 0 {
                    run.start = item.span.start;
                }
                run.end = item.span.end;
                run.count += 1;
            }
        }
    }
    run.flush(&mut out);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay comments out one per line and classify them by prefix.
    fn items(lines: &[&'static str]) -> Vec<TriviaItem<'static>> {
        let mut offset = 0;
        lines
            .iter()
            .map(|text| {
                let kind = if text.starts_with("//") {
                    TriviaKind::SingleLineComment
                } else {
                    TriviaKind::MultiLineComment
                };
                let item = TriviaItem::new(kind, Span::new(offset, offset + text.len()), text);
                offset += text.len() + 1;
                item
            })
            .collect()
    }

    #[test]
    fn test_run_then_block_comment() {
        let trivia = items(&["// a", "// b", "/* c */"]);
        let ranges = fold_comments(&trivia);
        assert_eq!(
            ranges,
            vec![
                Span::new(trivia[0].span.start, trivia[1].span.end),
                trivia[2].span
            ]
        );
    }

    #[test]
    fn test_single_comment_produces_nothing() {
        assert!(fold_comments(&items(&["// a"])).is_empty());
    }

    #[test]
    fn test_region_markers_are_excluded() {
        let trivia = items(&["// #region", "// a", "// b", "// #endregion"]);
        let ranges = fold_comments(&trivia);
        assert_eq!(
            ranges,
            vec![Span::new(trivia[1].span.start, trivia[2].span.end)]
        );
    }

    #[test]
    fn test_region_marker_splits_runs() {
        let trivia = items(&["// a", "// #region Helpers", "// b"]);
        assert!(fold_comments(&trivia).is_empty());
    }

    #[test]
    fn test_block_comment_splits_runs() {
        let trivia = items(&["// a", "/* b */", "// c", "// d"]);
        let ranges = fold_comments(&trivia);
        assert_eq!(
            ranges,
            vec![
                trivia[1].span,
                Span::new(trivia[2].span.start, trivia[3].span.end)
            ]
        );
    }

    #[test]
    fn test_region_delimiter_pattern() {
        assert!(is_region_delimiter("// #region"));
        assert!(is_region_delimiter("//#endregion trailing label"));
        assert!(is_region_delimiter("  // #region Public API"));
        assert!(!is_region_delimiter("// #regional"));
        assert!(!is_region_delimiter("// a #region"));
    }
}
