//! Graph writer: symbol hierarchy builder and reference recorder.
//!
//! [`GraphWriter`] is the only path from the indexer to the store during a
//! pass. It owns no data; it borrows the store and the per-session
//! [`IndexState`] (file memo, symbol memo, module layout, counters).
//!
//! Symbols are upserted by hierarchy. Recording a hierarchy a second time
//! returns the first id and writes no second kind or definition row. The one
//! exception is a symbol first seen implicitly (a base class name, an import)
//! and later declared explicitly: its kind and definition kind are replaced
//! once, in place.
//!
//! References are never deduplicated.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{IndexError, IndexResult, RecordKind};
use crate::graph::{
    DefinitionKind, FileId, NameHierarchy, ReferenceId, ReferenceKind, SourceRange, SymbolId,
    SymbolKind,
};
use crate::hierarchy::ModuleLayout;
use crate::registry::FileRegistry;
use crate::store::GraphStore;
use crate::text::LineIndex;
use crate::trivia::{fold_comments, TriviaItem};

// ============================================================================
// Session State
// ============================================================================

/// Counters for one indexing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub symbols: usize,
    pub references: usize,
    /// Diagnostics persisted against a file.
    pub diagnostics: usize,
    /// Diagnostics with no file, only logged.
    pub unbound_diagnostics: usize,
    pub atomic_ranges: usize,
}

#[derive(Debug, Clone, Copy)]
struct SymbolEntry {
    id: SymbolId,
    definition: DefinitionKind,
}

/// Memo of the symbols recorded during one session.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<NameHierarchy, SymbolEntry>,
}

impl SymbolTable {
    pub fn get(&self, hierarchy: &NameHierarchy) -> Option<SymbolId> {
        self.entries.get(hierarchy).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a session keeps between `open` and `close`.
#[derive(Debug)]
pub struct IndexState {
    pub files: FileRegistry,
    pub symbols: SymbolTable,
    pub layout: ModuleLayout,
    pub stats: IndexStats,
    atomic_ranges: HashSet<SourceRange>,
}

impl IndexState {
    pub fn new(layout: ModuleLayout) -> Self {
        IndexState {
            files: FileRegistry::new(),
            symbols: SymbolTable::default(),
            layout,
            stats: IndexStats::default(),
            atomic_ranges: HashSet::new(),
        }
    }
}

// ============================================================================
// Graph Writer
// ============================================================================

/// Write handle for one indexing pass.
pub struct GraphWriter<'a> {
    store: &'a mut dyn GraphStore,
    state: &'a mut IndexState,
}

impl<'a> GraphWriter<'a> {
    pub fn new(store: &'a mut dyn GraphStore, state: &'a mut IndexState) -> Self {
        GraphWriter { store, state }
    }

    pub fn layout(&self) -> &ModuleLayout {
        &self.state.layout
    }

    pub fn stats(&self) -> IndexStats {
        self.state.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut IndexStats {
        &mut self.state.stats
    }

    pub(crate) fn store(&mut self) -> &mut dyn GraphStore {
        &mut *self.store
    }

    /// Id of an already recorded symbol.
    pub fn symbol(&self, hierarchy: &NameHierarchy) -> Option<SymbolId> {
        self.state.symbols.get(hierarchy)
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    pub fn get_or_create_file(&mut self, path: &Path) -> IndexResult<FileId> {
        let before = self.state.files.len();
        let id = self.state.files.get_or_create_file(&mut *self.store, path)?;
        if self.state.files.len() > before {
            self.state.stats.files += 1;
        }
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------------

    /// Upsert the symbol for `hierarchy`.
    pub fn record_symbol(
        &mut self,
        hierarchy: &NameHierarchy,
        kind: SymbolKind,
        definition: DefinitionKind,
    ) -> IndexResult<SymbolId> {
        if let Some(entry) = self.state.symbols.entries.get(hierarchy).copied() {
            let upgrade = entry.definition == DefinitionKind::Implicit
                && definition == DefinitionKind::Explicit;
            if upgrade {
                self.write_kinds(entry.id, hierarchy, kind, definition)?;
                self.state.symbols.entries.insert(
                    hierarchy.clone(),
                    SymbolEntry {
                        id: entry.id,
                        definition,
                    },
                );
                debug!("upgraded {} to explicit {}", hierarchy, kind);
            }
            return Ok(entry.id);
        }

        let id = self
            .store
            .record_symbol(hierarchy)
            .map_err(|e| IndexError::record(RecordKind::Symbol, hierarchy, e))?;
        self.write_kinds(id, hierarchy, kind, definition)?;
        self.state.symbols.entries.insert(
            hierarchy.clone(),
            SymbolEntry { id, definition },
        );
        self.state.stats.symbols += 1;
        debug!("recorded {} {} as {}", kind, hierarchy, id);
        Ok(id)
    }

    fn write_kinds(
        &mut self,
        id: SymbolId,
        hierarchy: &NameHierarchy,
        kind: SymbolKind,
        definition: DefinitionKind,
    ) -> IndexResult<()> {
        self.store
            .record_symbol_kind(id, kind)
            .map_err(|e| IndexError::record(RecordKind::SymbolKind, hierarchy, e))?;
        self.store
            .record_symbol_definition_kind(id, definition)
            .map_err(|e| IndexError::record(RecordKind::DefinitionKind, hierarchy, e))
    }

    /// Declaration location (the name).
    pub fn attach_location(&mut self, id: SymbolId, range: &SourceRange) -> IndexResult<()> {
        self.store
            .record_symbol_location(id, range)
            .map_err(|e| IndexError::record(RecordKind::SymbolLocation, id, e))
    }

    /// Full declared extent.
    pub fn attach_scope(&mut self, id: SymbolId, range: &SourceRange) -> IndexResult<()> {
        self.store
            .record_symbol_scope_location(id, range)
            .map_err(|e| IndexError::record(RecordKind::ScopeLocation, id, e))
    }

    pub fn attach_signature(&mut self, id: SymbolId, range: &SourceRange) -> IndexResult<()> {
        self.store
            .record_symbol_signature_location(id, range)
            .map_err(|e| IndexError::record(RecordKind::SignatureLocation, id, e))
    }

    // ------------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------------

    /// Record a new edge. Every call creates a distinct reference.
    pub fn record_reference(
        &mut self,
        from: SymbolId,
        to: SymbolId,
        kind: ReferenceKind,
        location: Option<&SourceRange>,
    ) -> IndexResult<ReferenceId> {
        let edge = format!("{} -> {} ({})", from, to, kind);
        let id = self
            .store
            .record_reference(from, to, kind)
            .map_err(|e| IndexError::record(RecordKind::Reference, &edge, e))?;
        if let Some(range) = location {
            self.store
                .record_reference_location(id, range)
                .map_err(|e| IndexError::record(RecordKind::ReferenceLocation, &edge, e))?;
        }
        self.state.stats.references += 1;
        debug!("recorded reference {}", edge);
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Atomic Ranges
    // ------------------------------------------------------------------------

    /// Fold a node's leading trivia and record the resulting ranges.
    ///
    /// Returns how many new ranges were recorded. A range already recorded
    /// in this session is skipped.
    pub fn record_leading_trivia(
        &mut self,
        file_id: FileId,
        lines: &LineIndex,
        trivia: &[TriviaItem<'_>],
    ) -> IndexResult<usize> {
        let mut recorded = 0;
        for span in fold_comments(trivia) {
            let range = lines.range(file_id, span);
            if !self.state.atomic_ranges.insert(range) {
                continue;
            }
            self.store
                .record_atomic_source_range(&range)
                .map_err(|e| IndexError::record(RecordKind::AtomicRange, range, e))?;
            recorded += 1;
        }
        self.state.stats.atomic_ranges += recorded;
        Ok(recorded)
    }
}

// ============================================================================
// Tests
// ============================================================================
