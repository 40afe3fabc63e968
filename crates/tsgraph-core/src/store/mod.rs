//! Store write API and backends.
//!
//! [`GraphStore`] is the narrow interface the indexer writes through. Two
//! backends implement it:
//!
//! - [`MemoryStore`]: tables in memory, with a snapshot per commit
//! - [`JsonStore`]: tables persisted as one JSON document, written atomically
//!   at commit
//!
//! Both keep a rollback copy at `begin_transaction`. Closing a store while a
//! transaction is still open restores that copy, so a failed pass never
//! leaves partial tables behind.

mod json;
mod memory;

pub use json::{JsonStore, StoreDocument};
pub use memory::{MemoryStore, WriteStats};

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::graph::{
    DefinitionKind, ErrorRecord, FileId, GraphData, NameHierarchy, ReferenceId, ReferenceKind,
    SourceRange, SymbolId, SymbolKind,
};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not open")]
    NotOpen,

    #[error("store is already open at {}", path.display())]
    AlreadyOpen { path: PathBuf },

    #[error("no transaction is active")]
    NoTransaction,

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("unknown file id {0}")]
    UnknownFile(FileId),

    #[error("unknown symbol id {0}")]
    UnknownSymbol(SymbolId),

    #[error("unknown reference id {0}")]
    UnknownReference(ReferenceId),

    #[error("store corrupt at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Store Trait
// ============================================================================

/// Write interface of a symbol graph store.
///
/// Backends provide the lifecycle operations and [`GraphStore::tables`];
/// the record operations have shared default implementations on top of
/// [`GraphData`]. Every write requires an open store and an active
/// transaction.
pub trait GraphStore {
    /// Open the store at `target`.
    fn open(&mut self, target: &Path) -> StoreResult<()>;

    /// Close the store. An uncommitted transaction is rolled back.
    fn close(&mut self) -> StoreResult<()>;

    fn is_open(&self) -> bool;

    fn begin_transaction(&mut self) -> StoreResult<()>;

    fn commit_transaction(&mut self) -> StoreResult<()>;

    fn optimize_memory(&mut self) -> StoreResult<()>;

    /// Writable tables; fails unless open with an active transaction.
    fn tables(&mut self) -> StoreResult<&mut GraphData>;

    /// Remove every row.
    fn clear(&mut self) -> StoreResult<()> {
        *self.tables()? = GraphData::new();
        Ok(())
    }

    fn record_file(&mut self, path: &str) -> StoreResult<FileId> {
        Ok(self.tables()?.upsert_file(path))
    }

    fn record_file_language(&mut self, id: FileId, language: &str) -> StoreResult<()> {
        let file = self
            .tables()?
            .file_mut(id)
            .ok_or(StoreError::UnknownFile(id))?;
        file.language = Some(language.to_string());
        Ok(())
    }

    fn record_symbol(&mut self, hierarchy: &NameHierarchy) -> StoreResult<SymbolId> {
        Ok(self.tables()?.upsert_symbol(hierarchy))
    }

    fn record_symbol_kind(&mut self, id: SymbolId, kind: SymbolKind) -> StoreResult<()> {
        let symbol = self
            .tables()?
            .symbol_mut(id)
            .ok_or(StoreError::UnknownSymbol(id))?;
        symbol.kind = Some(kind);
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
        Ok(())
    }

    fn record_symbol_location(&mut self, id: SymbolId, range: &SourceRange) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        let symbol = tables.symbol_mut(id).ok_or(StoreError::UnknownSymbol(id))?;
        symbol.locations.push(*range);
        Ok(())
    }

    fn record_symbol_scope_location(
        &mut self,
        id: SymbolId,
        range: &SourceRange,
    ) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        let symbol = tables.symbol_mut(id).ok_or(StoreError::UnknownSymbol(id))?;
        symbol.scopes.push(*range);
        Ok(())
    }

    fn record_symbol_signature_location(
        &mut self,
        id: SymbolId,
        range: &SourceRange,
    ) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        let symbol = tables.symbol_mut(id).ok_or(StoreError::UnknownSymbol(id))?;
        symbol.signatures.push(*range);
        Ok(())
    }

    fn record_reference(
        &mut self,
        from: SymbolId,
        to: SymbolId,
        kind: ReferenceKind,
    ) -> StoreResult<ReferenceId> {
        let tables = self.tables()?;
        for id in [from, to] {
            if tables.symbol(id).is_none() {
                return Err(StoreError::UnknownSymbol(id));
            }
        }
        Ok(tables.push_reference(from, to, kind))
    }

    fn record_reference_location(
        &mut self,
        id: ReferenceId,
        range: &SourceRange,
    ) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        let reference = tables
            .reference_mut(id)
            .ok_or(StoreError::UnknownReference(id))?;
        reference.locations.push(*range);
        Ok(())
    }

    fn record_error(&mut self, message: &str, fatal: bool, range: &SourceRange) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        tables.errors.push(ErrorRecord {
            message: message.to_string(),
            fatal,
            range: *range,
        });
        Ok(())
    }

    fn record_atomic_source_range(&mut self, range: &SourceRange) -> StoreResult<()> {
        let tables = self.tables()?;
        check_range(tables, range)?;
        tables.atomic_ranges.push(*range);
        Ok(())
    }
}

/// Every range must point at a registered file.
fn check_range(tables: &GraphData, range: &SourceRange) -> StoreResult<()> {
    match tables.file(range.file_id) {
        Some(_) => Ok(()),
        None => Err(StoreError::UnknownFile(range.file_id)),
    }
}

// ============================================================================
// Transaction State
// ============================================================================

/// Open/transaction bookkeeping shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct TxState {
    pub(crate) data: GraphData,
    target: Option<PathBuf>,
    rollback: Option<GraphData>,
}

impl TxState {
    pub(crate) fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn in_transaction(&self) -> bool {
        self.rollback.is_some()
    }

    pub(crate) fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    pub(crate) fn open(&mut self, target: &Path, data: GraphData) -> StoreResult<()> {
        if let Some(path) = &self.target {
            return Err(StoreError::AlreadyOpen { path: path.clone() });
        }
        self.target = Some(target.to_path_buf());
        self.data = data;
        self.rollback = None;
        Ok(())
    }

    /// Close, rolling back an active transaction. Returns whether it did.
    pub(crate) fn close(&mut self) -> StoreResult<bool> {
        if self.target.take().is_none() {
            return Err(StoreError::NotOpen);
        }
        let rolled_back = match self.rollback.take() {
            Some(previous) => {
                self.data = previous;
                true
            }
            None => false,
        };
        Ok(rolled_back)
    }

    pub(crate) fn begin(&mut self) -> StoreResult<()> {
        if !self.is_open() {
            return Err(StoreError::NotOpen);
        }
        if self.in_transaction() {
            return Err(StoreError::TransactionActive);
        }
        self.rollback = Some(self.data.clone());
        Ok(())
    }

    pub(crate) fn commit(&mut self) -> StoreResult<()> {
        if !self.is_open() {
            return Err(StoreError::NotOpen);
        }
        if self.rollback.take().is_none() {
            return Err(StoreError::NoTransaction);
        }
        Ok(())
    }

    pub(crate) fn writable(&mut self) -> StoreResult<&mut GraphData> {
        if !self.is_open() {
            return Err(StoreError::NotOpen);
        }
        if !self.in_transaction() {
            return Err(StoreError::NoTransaction);
        }
        Ok(&mut self.data)
    }

    pub(crate) fn optimize(&mut self) -> StoreResult<()> {
        if !self.is_open() {
            return Err(StoreError::NotOpen);
        }
        self.data.compact();
        Ok(())
    }
}
