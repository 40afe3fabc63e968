//! Triple-slash reference directives.
//!
//! ```text
//! /// <reference path="./globals.d.ts" />
//! /// <reference types="node" />
//! /// <reference lib="es2015" />
//! ```
//!
//! Directives are only honoured in the comments that open a file, before
//! its first statement. Each one names another file to include; resolving
//! that name follows `tsc`: relative paths with implied extensions, and
//! `node_modules` lookups walking up from the including file.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;
use tsgraph_core::registry::normalize_path;
use tsgraph_core::text::{Point, Span};

use crate::program::SourceHost;

static REFERENCE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^///\s*<reference\s+(path|types|lib)\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*?/?>"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Path,
    Types,
    Lib,
}

impl DirectiveKind {
    fn from_attribute(name: &str) -> Option<Self> {
        match name {
            "path" => Some(DirectiveKind::Path),
            "types" => Some(DirectiveKind::Types),
            "lib" => Some(DirectiveKind::Lib),
            _ => None,
        }
    }

    /// Diagnostic reported when the directive does not resolve.
    pub fn unresolved_message(&self, value: &str) -> String {
        match self {
            DirectiveKind::Path => format!("File '{}' not found.", value),
            DirectiveKind::Types => {
                format!("Cannot find type definition file for '{}'.", value)
            }
            DirectiveKind::Lib => format!("Cannot find lib definition for '{}'.", value),
        }
    }
}

/// Where a directive led.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    /// Zero-based end of the target file's text.
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Literal attribute value, as written.
    pub value: String,
    /// Span of the whole comment.
    pub span: Span,
    pub resolution: Option<Resolution>,
}

/// Parse one comment's text as a directive.
pub fn parse_directive(text: &str, span: Span) -> Option<Directive> {
    let caps = REFERENCE_DIRECTIVE.captures(text.trim_end())?;
    let kind = DirectiveKind::from_attribute(caps.get(1)?.as_str())?;
    let value = caps.get(2).or_else(|| caps.get(3))?.as_str().trim();
    if value.is_empty() {
        return None;
    }
    Some(Directive {
        kind,
        value: value.to_string(),
        span,
        resolution: None,
    })
}

/// Directives in the comments that precede a file's first statement.
pub fn collect_directives(root: Node<'_>, source: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "comment" {
            break;
        }
        let Ok(text) = child.utf8_text(source.as_bytes()) else {
            continue;
        };
        let span = Span::new(child.start_byte(), child.end_byte());
        if let Some(directive) = parse_directive(text, span) {
            directives.push(directive);
        }
    }
    directives
}

/// Locate the file a directive names, relative to the including file.
pub fn resolve_target(
    kind: DirectiveKind,
    value: &str,
    from_file: &Path,
    host: &dyn SourceHost,
) -> Option<PathBuf> {
    let dir = from_file.parent()?;
    match kind {
        DirectiveKind::Path => {
            let base = dir.join(value);
            let with_ext = |ext: &str| PathBuf::from(format!("{}{}", base.display(), ext));
            [base.clone(), with_ext(".ts"), with_ext(".d.ts")]
                .into_iter()
                .map(|candidate| normalize_path(&candidate))
                .find(|candidate| host.is_file(candidate))
        }
        DirectiveKind::Types => search_upward(dir, host, |modules| {
            vec![
                modules.join("@types").join(value).join("index.d.ts"),
                modules.join(value).join("index.d.ts"),
            ]
        }),
        DirectiveKind::Lib => {
            let file = format!("lib.{}.d.ts", value.to_ascii_lowercase());
            search_upward(dir, host, |modules| {
                vec![modules.join("typescript").join("lib").join(&file)]
            })
        }
    }
}

fn search_upward(
    start: &Path,
    host: &dyn SourceHost,
    candidates: impl Fn(&Path) -> Vec<PathBuf>,
) -> Option<PathBuf> {
    let start = normalize_path(start);
    start.ancestors().find_map(|dir| {
        candidates(&dir.join("node_modules"))
            .into_iter()
            .find(|candidate| host.is_file(candidate))
    })
}

// ============================================================================
// Tests
// ============================================================================
