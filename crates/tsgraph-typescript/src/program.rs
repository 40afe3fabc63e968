//! Program loading: source files, syntax trees and front-end diagnostics.
//!
//! A [`Program`] is the parsed form of a resolved project. Loading starts
//! from the project's root files and follows `/// <reference path>`
//! directives to further files. Every file is parsed with tree-sitter; parse
//! errors, unresolved directives and unreadable files become
//! [`ProgramDiagnostic`]s. Diagnostics are data and never stop loading.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use tree_sitter::{Node, Parser, Tree};
use tsgraph_core::diagnostics::{Diagnostic, DiagnosticMessage};
use tsgraph_core::error::{IndexError, IndexResult};
use tsgraph_core::graph::{FileId, SourceRange};
use tsgraph_core::registry::{normalize_path, Language};
use tsgraph_core::text::{LineIndex, Point, Span};

use crate::directives::{collect_directives, resolve_target, Directive, DirectiveKind, Resolution};
use crate::project::ProjectConfig;
use crate::syntax::{collapse_whitespace, span};

/// Longest snippet quoted in an "Unexpected text" diagnostic.
const SNIPPET_CHARS: usize = 60;

// ============================================================================
// Source Host
// ============================================================================

/// Where source text comes from.
pub trait SourceHost {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn is_file(&self, path: &Path) -> bool;
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskHost;

impl SourceHost for DiskHost {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory sources keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    sources: HashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new(sources: impl IntoIterator<Item = (PathBuf, String)>) -> Self {
        MemoryHost {
            sources: sources
                .into_iter()
                .map(|(path, text)| (normalize_path(&path), text))
                .collect(),
        }
    }
}

impl SourceHost for MemoryHost {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.sources
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such source"))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.sources.contains_key(&normalize_path(path))
    }
}

// ============================================================================
// Source Files
// ============================================================================

/// One parsed file.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    tree: Tree,
    lines: LineIndex,
    directives: Vec<Directive>,
}

impl SourceFile {
    /// Parse `text` with the grammar matching the path's extension.
    pub fn parse(path: PathBuf, text: String) -> IndexResult<Self> {
        let mut parser = Parser::new();
        let language = match Language::from_path(&path) {
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX,
            _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
        };
        parser
            .set_language(&language.into())
            .map_err(|e| IndexError::internal(format!("cannot load TypeScript grammar: {}", e)))?;
        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| IndexError::internal(format!("parse failed: {}", path.display())))?;
        let lines = LineIndex::new(&text);
        let directives = collect_directives(tree.root_node(), &text);
        Ok(SourceFile {
            path,
            text,
            tree,
            lines,
            directives,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Store range of a node in this file.
    pub fn range(&self, file_id: FileId, node: Node<'_>) -> SourceRange {
        self.lines.range(file_id, span(node))
    }

    /// Text of a type node, whitespace-normalized.
    pub fn type_text(&self, node: Node<'_>) -> String {
        collapse_whitespace(node.utf8_text(self.text.as_bytes()).unwrap_or(""))
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A diagnostic as the front-end reports it: a byte offset and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDiagnostic {
    pub file: Option<PathBuf>,
    pub message: DiagnosticMessage,
    pub start: usize,
    pub length: usize,
    pub fatal: bool,
}

impl ProgramDiagnostic {
    fn in_file(file: &Path, message: DiagnosticMessage, span: Span) -> Self {
        ProgramDiagnostic {
            file: Some(file.to_path_buf()),
            message,
            start: span.start,
            length: span.len(),
            fatal: false,
        }
    }

    fn unbound(message: String, fatal: bool) -> Self {
        ProgramDiagnostic {
            file: None,
            message: DiagnosticMessage::Text(message),
            start: 0,
            length: 0,
            fatal,
        }
    }
}

/// Parse errors of one file, in source order.
fn syntax_diagnostics(file: &SourceFile) -> Vec<ProgramDiagnostic> {
    let mut out = Vec::new();
    let root = file.tree.root_node();
    if !root.has_error() {
        return out;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            let text = node.utf8_text(file.text.as_bytes()).unwrap_or("");
            let snippet: String = collapse_whitespace(text).chars().take(SNIPPET_CHARS).collect();
            let message = DiagnosticMessage::Chain(vec![
                "Declaration or statement expected.".to_string(),
                format!("Unexpected text: `{}`", snippet),
            ]);
            out.push(ProgramDiagnostic::in_file(&file.path, message, span(node)));
        } else if node.is_missing() {
            let message = DiagnosticMessage::Text(format!("'{}' expected.", node.kind()));
            out.push(ProgramDiagnostic::in_file(&file.path, message, span(node)));
        } else if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    out
}

// ============================================================================
// Program
// ============================================================================

/// All parsed files of a run plus their diagnostics.
#[derive(Debug)]
pub struct Program {
    root: PathBuf,
    files: Vec<SourceFile>,
    diagnostics: Vec<ProgramDiagnostic>,
}

impl Program {
    /// Load a resolved project from disk.
    pub fn load(project: &ProjectConfig) -> IndexResult<Self> {
        let mut program = Self::load_with(project.root(), project.files(), &DiskHost)?;
        if project.files().is_empty() {
            if let Some(config) = project.config_path() {
                program.diagnostics.push(ProgramDiagnostic::unbound(
                    format!("No inputs were found in config file '{}'.", config.display()),
                    true,
                ));
            }
        }
        info!(
            "loaded {} files with {} diagnostics",
            program.files.len(),
            program.diagnostics.len()
        );
        Ok(program)
    }

    /// Load in-memory sources; every source is a root file.
    pub fn from_sources(
        root: impl Into<PathBuf>,
        sources: Vec<(PathBuf, String)>,
    ) -> IndexResult<Self> {
        let root: PathBuf = root.into();
        let roots: Vec<PathBuf> = sources.iter().map(|(p, _)| normalize_path(p)).collect();
        let host = MemoryHost::new(sources);
        Self::load_with(&root, &roots, &host)
    }

    /// Load `roots` and every file their path directives reach.
    pub fn load_with(root: &Path, roots: &[PathBuf], host: &dyn SourceHost) -> IndexResult<Self> {
        let mut files: Vec<SourceFile> = Vec::new();
        let mut targets: Vec<Vec<Option<PathBuf>>> = Vec::new();
        let mut diagnostics = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut queue: VecDeque<PathBuf> = roots.iter().map(|p| normalize_path(p)).collect();

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            let text = match host.read(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("cannot read {}: {}", path.display(), e);
                    diagnostics.push(ProgramDiagnostic::unbound(
                        format!("Cannot read file '{}': {}.", path.display(), e),
                        true,
                    ));
                    continue;
                }
            };
            let file = SourceFile::parse(path, text)?;
            let file_targets: Vec<Option<PathBuf>> = file
                .directives
                .iter()
                .map(|d| resolve_target(d.kind, &d.value, &file.path, host))
                .collect();
            for (directive, target) in file.directives.iter().zip(&file_targets) {
                if let (DirectiveKind::Path, Some(target)) = (directive.kind, target) {
                    queue.push_back(target.clone());
                }
            }
            debug!(
                "parsed {} ({} directives)",
                file.path.display(),
                file.directives.len()
            );
            files.push(file);
            targets.push(file_targets);
        }

        let ends: HashMap<PathBuf, Point> = files
            .iter()
            .map(|f| (f.path.clone(), f.lines.end_point()))
            .collect();
        for (file, file_targets) in files.iter_mut().zip(targets) {
            for (directive, target) in file.directives.iter_mut().zip(file_targets) {
                let end = target.as_ref().and_then(|t| {
                    ends.get(t).copied().or_else(|| {
                        let text = host.read(t).ok()?;
                        Some(LineIndex::new(&text).end_point())
                    })
                });
                match (target, end) {
                    (Some(path), Some(end)) => {
                        directive.resolution = Some(Resolution { path, end });
                    }
                    _ => {
                        let message = directive.kind.unresolved_message(&directive.value);
                        diagnostics.push(ProgramDiagnostic::in_file(
                            &file.path,
                            DiagnosticMessage::Text(message),
                            directive.span,
                        ));
                    }
                }
            }
        }

        for file in &files {
            diagnostics.extend(syntax_diagnostics(file));
        }

        Ok(Program {
            root: normalize_path(root),
            files,
            diagnostics,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        let path = normalize_path(path);
        self.files.iter().find(|f| f.path == path)
    }

    /// Diagnostics with offsets mapped to zero-based points.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .map(|d| {
                let lines = d.file.as_deref().and_then(|p| self.file(p)).map(|f| &f.lines);
                let (start, end) = match lines {
                    Some(lines) => (lines.point(d.start), lines.point(d.start + d.length)),
                    None => (Point::default(), Point::default()),
                };
                Diagnostic {
                    file: d.file.clone(),
                    message: d.message.clone(),
                    start,
                    end,
                    fatal: d.fatal,
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
