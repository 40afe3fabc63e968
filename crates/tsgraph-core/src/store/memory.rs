//! In-memory store backend.

use std::path::Path;

use tracing::warn;

use super::{GraphStore, StoreError, StoreResult, TxState};
use crate::graph::{DefinitionKind, GraphData, SymbolId, SymbolKind};

/// Counters of lifecycle calls and attribute writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub opens: usize,
    pub closes: usize,
    pub transactions: usize,
    pub clears: usize,
    pub optimizations: usize,
    pub kind_writes: usize,
    pub definition_writes: usize,
}

/// A store that keeps its tables in memory.
///
/// Every commit appends a copy of the tables to [`MemoryStore::commits`],
/// which makes the commit boundaries of a session observable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: TxState,
    commits: Vec<GraphData>,
    stats: WriteStats,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Tables as of the last commit (or the current tables when closed).
    pub fn data(&self) -> &GraphData {
        &self.state.data
    }

    /// One copy of the tables per commit, oldest first.
    pub fn commits(&self) -> &[GraphData] {
        &self.commits
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn target(&self) -> Option<&Path> {
        self.state.target()
    }
}

impl GraphStore for MemoryStore {
    fn open(&mut self, target: &Path) -> StoreResult<()> {
        let data = std::mem::take(&mut self.state.data);
        self.state.open(target, data)?;
        self.stats.opens += 1;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.state.close()? {
            warn!("closed memory store with an open transaction; changes discarded");
        }
        self.stats.closes += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn begin_transaction(&mut self) -> StoreResult<()> {
        self.state.begin()?;
        self.stats.transactions += 1;
        Ok(())
    }

    fn commit_transaction(&mut self) -> StoreResult<()> {
        self.state.commit()?;
        self.commits.push(self.state.data.clone());
        Ok(())
    }

    fn optimize_memory(&mut self) -> StoreResult<()> {
        self.state.optimize()?;
        self.stats.optimizations += 1;
        Ok(())
    }

    fn tables(&mut self) -> StoreResult<&mut GraphData> {
        self.state.writable()
    }

    fn clear(&mut self) -> StoreResult<()> {
        *self.tables()? = GraphData::new();
        self.stats.clears += 1;
        Ok(())
    }

    fn record_symbol_kind(&mut self, id: SymbolId, kind: SymbolKind) -> StoreResult<()> {
        let symbol = self
            .tables()?
            .symbol_mut(id)
            .ok_or(StoreError::UnknownSymbol(id))?;
        symbol.kind = Some(kind);
        self.stats.kind_writes += 1;
        Ok(())
    }

    fn record_symbol_definition_kind(
        &mut self,
        id: SymbolId,
        definition: DefinitionKind,
    ) -> StoreResult<()> {
        let symbol = self
            .tables()?
            .symbol_mut(id)
            .ok_or(StoreError::UnknownSymbol(id))?;
        symbol.definition = Some(definition);
        self.stats.definition_writes += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FileId, NameDelimiter, NameHierarchy, SourceRange};

    fn open_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.open(Path::new("mem.tsgraph")).unwrap();
        store
    }

    #[test]
    fn test_writes_require_transaction() {
        let mut store = open_store();
        let err = store.record_file("/w/a.ts").unwrap_err();
        assert!(matches!(err, StoreError::NoTransaction));
    }

    #[test]
    fn test_writes_require_open_store() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.begin_transaction().unwrap_err(),
            StoreError::NotOpen
        ));
    }

    #[test]
    fn test_commit_snapshots_tables() {
        let mut store = open_store();
        store.begin_transaction().unwrap();
        store.record_file("/w/a.ts").unwrap();
        store.commit_transaction().unwrap();
        assert_eq!(store.commits().len(), 1);
        assert_eq!(store.commits()[0].files.len(), 1);
    }

    #[test]
    fn test_close_rolls_back_open_transaction() {
        let mut store = open_store();
        store.begin_transaction().unwrap();
        store.record_file("/w/a.ts").unwrap();
        store.commit_transaction().unwrap();

        store.begin_transaction().unwrap();
        store.record_file("/w/b.ts").unwrap();
        store.close().unwrap();

        assert!(!store.is_open());
        assert_eq!(store.data().files.len(), 1);
        assert_eq!(store.stats().closes, 1);
    }

    #[test]
    fn test_range_must_reference_existing_file() {
        let mut store = open_store();
        store.begin_transaction().unwrap();
        let id = store
            .record_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"))
            .unwrap();
        let range = SourceRange::new(FileId(7), (1, 1), (1, 2));
        assert!(matches!(
            store.record_symbol_location(id, &range).unwrap_err(),
            StoreError::UnknownFile(FileId(7))
        ));
    }

    #[test]
    fn test_kind_writes_are_counted() {
        let mut store = open_store();
        store.begin_transaction().unwrap();
        let id = store
            .record_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"))
            .unwrap();
        store
            .record_symbol_kind(id, SymbolKind::GlobalVariable)
            .unwrap();
        store
            .record_symbol_definition_kind(id, DefinitionKind::Explicit)
            .unwrap();
        assert_eq!(store.stats().kind_writes, 1);
        assert_eq!(store.stats().definition_writes, 1);
    }

    #[test]
    fn test_reference_to_unknown_symbol_fails() {
        let mut store = open_store();
        store.begin_transaction().unwrap();
        let id = store
            .record_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"))
            .unwrap();
        let err = store
            .record_reference(id, SymbolId(9), crate::graph::ReferenceKind::Usage)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSymbol(SymbolId(9))));
    }
}
