//! Graph model: identities, name hierarchies, source ranges and record tables.
//!
//! This module provides the data model the indexer writes into a store:
//! - [`FileRecord`]: source artifacts keyed by normalized path
//! - [`SymbolRecord`]: symbols keyed by their [`NameHierarchy`]
//! - [`ReferenceRecord`]: directed, kinded edges between symbols
//! - [`ErrorRecord`]: persisted diagnostics
//! - atomic ranges: comment regions that must not be subdivided
//!
//! [`GraphData`] holds the tables plus lookup indexes. Both store backends
//! share it, so the in-memory and on-disk representations cannot drift.
//!
//! # Identity
//!
//! A symbol's identity is its hierarchy: the delimiter plus the ordered,
//! non-empty element list. Files are identified by their normalized path.
//! References have no natural key; every recorded edge gets a fresh id.
//!
//! # Schema Versioning
//!
//! [`GRAPH_SCHEMA_VERSION`] tracks breaking changes to the serialized tables.
//! It is independent of the CLI response schema version in `output.rs`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Schema Version
// ============================================================================

/// Schema version for serialized [`GraphData`].
///
/// Increment this when adding/removing serialized fields or changing the
/// meaning of an enum variant.
pub const GRAPH_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a file within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// Unique identifier for a symbol within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Create a new symbol ID.
    pub fn new(id: u32) -> Self {
        SymbolId(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

/// Unique identifier for a reference within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ReferenceId(pub u32);

impl ReferenceId {
    /// Create a new reference ID.
    pub fn new(id: u32) -> Self {
        ReferenceId(id)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref_{}", self.0)
    }
}

// ============================================================================
// Kinds
// ============================================================================

/// Kind of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// One source file, named by its path segments.
    Module,
    /// A dependency package (`node_modules/<name>`).
    Package,
    Namespace,
    Class,
    Interface,
    /// Property, accessor, parameter property or signature-only member.
    Field,
    Method,
    Function,
    GlobalVariable,
    Enum,
    EnumConstant,
    /// A type alias name.
    Type,
    /// The text of a type alias's right-hand side.
    Typedef,
    /// A triple-slash reference directive.
    Macro,
}

impl SymbolKind {
    /// Stable lowercase name used in logs and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Package => "package",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Function => "function",
            SymbolKind::GlobalVariable => "global_variable",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumConstant => "enum_constant",
            SymbolKind::Type => "type",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Macro => "macro",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a symbol was declared directly or only inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Directly declared at a source location.
    Explicit,
    /// Inferred from a use site, path or merge.
    Implicit,
}

/// Kind of a reference edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Include,
    Usage,
    Inheritance,
    Import,
    Call,
    TypeUsage,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Include => "include",
            ReferenceKind::Usage => "usage",
            ReferenceKind::Inheritance => "inheritance",
            ReferenceKind::Import => "import",
            ReferenceKind::Call => "call",
            ReferenceKind::TypeUsage => "type_usage",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Name Hierarchy
// ============================================================================

/// Separator between the elements of a [`NameHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameDelimiter {
    /// Lexical nesting of declarations (`Outer.Inner.member`).
    Scope,
    /// File and package paths (`project/src/index.ts`).
    Path,
}

impl NameDelimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameDelimiter::Scope => ".",
            NameDelimiter::Path => "/",
        }
    }
}

/// Identity key of a symbol: a delimiter plus a non-empty list of elements.
///
/// Two hierarchies are equal iff both the delimiter and the element sequence
/// are equal. The element list can only be built non-empty, through
/// [`NameHierarchy::root`], [`NameHierarchy::child`] or a checked
/// [`NameHierarchy::from_elements`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHierarchy {
    delimiter: NameDelimiter,
    elements: Vec<String>,
}

impl NameHierarchy {
    /// A hierarchy with a single element.
    pub fn root(delimiter: NameDelimiter, name: impl Into<String>) -> Self {
        NameHierarchy {
            delimiter,
            elements: vec![name.into()],
        }
    }

    /// Build from an element sequence; `None` if the sequence is empty.
    pub fn from_elements<I, S>(delimiter: NameDelimiter, elements: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements: Vec<String> = elements.into_iter().map(Into::into).collect();
        if elements.is_empty() {
            None
        } else {
            Some(NameHierarchy {
                delimiter,
                elements,
            })
        }
    }

    /// This hierarchy extended by one element.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(name.into());
        NameHierarchy {
            delimiter: self.delimiter,
            elements,
        }
    }

    pub fn delimiter(&self) -> NameDelimiter {
        self.delimiter
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// The innermost element.
    pub fn leaf(&self) -> &str {
        self.elements.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for NameHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.elements.join(self.delimiter.as_str()))
    }
}

// ============================================================================
// Source Range
// ============================================================================

/// A span in a file, in the store's 1-based line/column convention.
///
/// Both the start and end points are shifted by one from the front-end's
/// zero-based points; see [`crate::text::to_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub file_id: FileId,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceRange {
    pub fn new(file_id: FileId, start: (u32, u32), end: (u32, u32)) -> Self {
        SourceRange {
            file_id,
            start_line: start.0,
            start_col: start.1,
            end_line: end.0,
            end_col: end.1,
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.file_id, self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

// ============================================================================
// Records
// ============================================================================

/// A registered source artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    /// Normalized absolute path.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A symbol and its secondary attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: SymbolId,
    pub hierarchy: NameHierarchy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SymbolKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<SourceRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SourceRange>,
}

/// A directed edge between two symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: ReferenceId,
    pub from: SymbolId,
    pub to: SymbolId,
    pub kind: ReferenceKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceRange>,
}

/// A persisted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub fatal: bool,
    pub range: SourceRange,
}

// ============================================================================
// Graph Tables
// ============================================================================

/// All tables of one symbol graph.
///
/// Ids are dense and equal to the row index of their table. The lookup
/// indexes are not serialized; call [`GraphData::restore_indexes`] after
/// deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub symbols: Vec<SymbolRecord>,
    #[serde(default)]
    pub references: Vec<ReferenceRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
    #[serde(default)]
    pub atomic_ranges: Vec<SourceRange>,
    #[serde(skip)]
    file_index: HashMap<String, FileId>,
    #[serde(skip)]
    symbol_index: HashMap<NameHierarchy, SymbolId>,
}

impl GraphData {
    pub fn new() -> Self {
        GraphData::default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.symbols.is_empty()
            && self.references.is_empty()
            && self.errors.is_empty()
            && self.atomic_ranges.is_empty()
    }

    /// Rebuild the lookup indexes from the tables.
    ///
    /// Returns a description of the first inconsistency found (an id that
    /// does not match its row, or a duplicate key).
    pub fn restore_indexes(&mut self) -> Result<(), String> {
        self.file_index.clear();
        self.symbol_index.clear();
        for (row, file) in self.files.iter().enumerate() {
            if file.id.0 as usize != row {
                return Err(format!("file row {} has id {}", row, file.id));
            }
            if self.file_index.insert(file.path.clone(), file.id).is_some() {
                return Err(format!("duplicate file path {}", file.path));
            }
        }
        for (row, symbol) in self.symbols.iter().enumerate() {
            if symbol.id.0 as usize != row {
                return Err(format!("symbol row {} has id {}", row, symbol.id));
            }
            if symbol.hierarchy.is_empty() {
                return Err(format!("symbol {} has an empty hierarchy", symbol.id));
            }
            if self
                .symbol_index
                .insert(symbol.hierarchy.clone(), symbol.id)
                .is_some()
            {
                return Err(format!("duplicate symbol {}", symbol.hierarchy));
            }
        }
        for (row, reference) in self.references.iter().enumerate() {
            if reference.id.0 as usize != row {
                return Err(format!("reference row {} has id {}", row, reference.id));
            }
        }
        Ok(())
    }

    /// Drop excess capacity from every table.
    pub fn compact(&mut self) {
        self.files.shrink_to_fit();
        self.symbols.shrink_to_fit();
        self.references.shrink_to_fit();
        self.errors.shrink_to_fit();
        self.atomic_ranges.shrink_to_fit();
        self.file_index.shrink_to_fit();
        self.symbol_index.shrink_to_fit();
    }

    // ------------------------------------------------------------------------
    // Upserts
    // ------------------------------------------------------------------------

    /// Insert a file row, or return the existing id for the same path.
    pub fn upsert_file(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.file_index.get(path) {
            return id;
        }
        let id = FileId::new(self.files.len() as u32);
        self.files.push(FileRecord {
            id,
            path: path.to_string(),
            language: None,
        });
        self.file_index.insert(path.to_string(), id);
        id
    }

    /// Insert a symbol row, or return the existing id for the same hierarchy.
    pub fn upsert_symbol(&mut self, hierarchy: &NameHierarchy) -> SymbolId {
        if let Some(&id) = self.symbol_index.get(hierarchy) {
            return id;
        }
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(SymbolRecord {
            id,
            hierarchy: hierarchy.clone(),
            kind: None,
            definition: None,
            locations: Vec::new(),
            scopes: Vec::new(),
            signatures: Vec::new(),
        });
        self.symbol_index.insert(hierarchy.clone(), id);
        id
    }

    /// Append a reference row. Edges are never merged.
    pub fn push_reference(
        &mut self,
        from: SymbolId,
        to: SymbolId,
        kind: ReferenceKind,
    ) -> ReferenceId {
        let id = ReferenceId::new(self.references.len() as u32);
        self.references.push(ReferenceRecord {
            id,
            from,
            to,
            kind,
            locations: Vec::new(),
        });
        id
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(id.0 as usize)
    }

    pub fn file_mut(&mut self, id: FileId) -> Option<&mut FileRecord> {
        self.files.get_mut(id.0 as usize)
    }

    pub fn file_by_path(&self, path: &str) -> Option<&FileRecord> {
        self.file_index.get(path).and_then(|id| self.file(*id))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolRecord> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut SymbolRecord> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn symbol_by_hierarchy(&self, hierarchy: &NameHierarchy) -> Option<&SymbolRecord> {
        self.symbol_index
            .get(hierarchy)
            .and_then(|id| self.symbol(*id))
    }

    /// Find a symbol by its elements, whatever the delimiter.
    pub fn symbol_by_elements(&self, elements: &[&str]) -> Option<&SymbolRecord> {
        self.symbols.iter().find(|s| {
            s.hierarchy.elements().len() == elements.len()
                && s.hierarchy
                    .elements()
                    .iter()
                    .zip(elements)
                    .all(|(a, b)| a == b)
        })
    }

    pub fn reference(&self, id: ReferenceId) -> Option<&ReferenceRecord> {
        self.references.get(id.0 as usize)
    }

    pub fn reference_mut(&mut self, id: ReferenceId) -> Option<&mut ReferenceRecord> {
        self.references.get_mut(id.0 as usize)
    }

    /// All edges leaving `from`, in insertion order.
    pub fn references_from(&self, from: SymbolId) -> impl Iterator<Item = &ReferenceRecord> {
        self.references.iter().filter(move |r| r.from == from)
    }

    /// All symbols of one kind, in insertion order.
    pub fn symbols_of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &SymbolRecord> {
        self.symbols.iter().filter(move |s| s.kind == Some(kind))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod hierarchy_tests {
        use super::*;

        #[test]
        fn test_hierarchy_equality_needs_same_delimiter() {
            let scope = NameHierarchy::root(NameDelimiter::Scope, "a");
            let path = NameHierarchy::root(NameDelimiter::Path, "a");
            assert_ne!(scope, path);
            assert_eq!(scope, NameHierarchy::root(NameDelimiter::Scope, "a"));
        }

        #[test]
        fn test_from_elements_rejects_empty() {
            let empty: Vec<String> = Vec::new();
            assert!(NameHierarchy::from_elements(NameDelimiter::Path, empty).is_none());
        }

        #[test]
        fn test_child_extends_elements() {
            let outer = NameHierarchy::root(NameDelimiter::Scope, "Outer");
            let member = outer.child("Inner").child("run");
            assert_eq!(member.elements(), ["Outer", "Inner", "run"]);
            assert_eq!(member.leaf(), "run");
            assert_eq!(member.to_string(), "Outer.Inner.run");
            assert_eq!(outer.len(), 1);
        }

        #[test]
        fn test_path_display_uses_slash() {
            let module =
                NameHierarchy::from_elements(NameDelimiter::Path, ["project", "src", "a.ts"])
                    .unwrap();
            assert_eq!(module.to_string(), "project/src/a.ts");
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_upsert_symbol_returns_existing_id() {
            let mut data = GraphData::new();
            let h = NameHierarchy::root(NameDelimiter::Scope, "X");
            let first = data.upsert_symbol(&h);
            let second = data.upsert_symbol(&h);
            assert_eq!(first, second);
            assert_eq!(data.symbols.len(), 1);
        }

        #[test]
        fn test_push_reference_never_merges() {
            let mut data = GraphData::new();
            let a = data.upsert_symbol(&NameHierarchy::root(NameDelimiter::Scope, "a"));
            let b = data.upsert_symbol(&NameHierarchy::root(NameDelimiter::Scope, "b"));
            let r1 = data.push_reference(a, b, ReferenceKind::Usage);
            let r2 = data.push_reference(a, b, ReferenceKind::Usage);
            assert_ne!(r1, r2);
            assert_eq!(data.references_from(a).count(), 2);
        }

        #[test]
        fn test_restore_indexes_after_round_trip() {
            let mut data = GraphData::new();
            data.upsert_file("/w/a.ts");
            data.upsert_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"));
            let json = serde_json::to_string(&data).unwrap();

            let mut restored: GraphData = serde_json::from_str(&json).unwrap();
            assert!(restored.file_by_path("/w/a.ts").is_none());
            restored.restore_indexes().unwrap();
            assert_eq!(restored.file_by_path("/w/a.ts").unwrap().id, FileId(0));
            assert_eq!(
                restored.upsert_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X")),
                SymbolId(0)
            );
        }

        #[test]
        fn test_restore_indexes_rejects_duplicate_symbols() {
            let mut data = GraphData::new();
            data.upsert_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"));
            let mut dup = data.symbols[0].clone();
            dup.id = SymbolId(1);
            data.symbols.push(dup);
            assert!(data.restore_indexes().is_err());
        }
    }
}
