//! Persistence session: store lifecycle and transaction boundaries.
//!
//! A session drives one store through
//!
//! ```text
//! Closed -> Open -> [begin -> clear -> commit -> optimize]
//!        -> begin -> indexing pass -> commit -> optimize -> Closed
//! ```
//!
//! The clear runs in its own committed transaction, so a failing indexing
//! pass leaves the store in its cleared (or pre-existing) state: the open
//! indexing transaction is rolled back when the store is closed.
//!
//! The file and symbol memos live in an [`IndexState`] created on open,
//! replaced on clear and dropped on close. Dropping a session that is still
//! open closes its store.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{IndexError, IndexResult};
use crate::hierarchy::ModuleLayout;
use crate::store::GraphStore;
use crate::writer::{GraphWriter, IndexState, IndexStats};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    Open,
    Clearing,
    Indexing,
}

/// One exclusive writer session over a store.
pub struct IndexSession<'s> {
    store: &'s mut dyn GraphStore,
    target: PathBuf,
    layout: ModuleLayout,
    state: Option<IndexState>,
    phase: SessionPhase,
}

impl<'s> IndexSession<'s> {
    pub fn new(store: &'s mut dyn GraphStore, target: &Path, layout: ModuleLayout) -> Self {
        IndexSession {
            store,
            target: target.to_path_buf(),
            layout,
            state: None,
            phase: SessionPhase::Closed,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Open the store and start fresh memos.
    pub fn open(&mut self) -> IndexResult<()> {
        if self.phase != SessionPhase::Closed {
            return Err(IndexError::internal("session is already open"));
        }
        self.store
            .open(&self.target)
            .map_err(|e| IndexError::store("open", e))?;
        self.state = Some(IndexState::new(self.layout.clone()));
        self.phase = SessionPhase::Open;
        info!("session opened on {}", self.target.display());
        Ok(())
    }

    /// Wipe the store in its own committed transaction.
    pub fn clear(&mut self) -> IndexResult<()> {
        self.expect_open()?;
        self.store
            .begin_transaction()
            .map_err(|e| IndexError::store("begin transaction", e))?;
        self.phase = SessionPhase::Clearing;
        self.store
            .clear()
            .map_err(|e| IndexError::store("clear", e))?;
        self.store
            .commit_transaction()
            .map_err(|e| IndexError::store("commit", e))?;
        self.store
            .optimize_memory()
            .map_err(|e| IndexError::store("optimize", e))?;
        self.state = Some(IndexState::new(self.layout.clone()));
        self.phase = SessionPhase::Open;
        info!("cleared {}", self.target.display());
        Ok(())
    }

    /// Run one indexing pass inside a transaction and commit it.
    ///
    /// If `pass` fails the transaction stays open; closing the session rolls
    /// it back.
    pub fn index<F>(&mut self, pass: F) -> IndexResult<IndexStats>
    where
        F: FnOnce(&mut GraphWriter<'_>) -> IndexResult<()>,
    {
        self.expect_open()?;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| IndexError::internal("session has no index state"))?;
        self.store
            .begin_transaction()
            .map_err(|e| IndexError::store("begin transaction", e))?;
        self.phase = SessionPhase::Indexing;
        state.stats = IndexStats::default();

        let mut writer = GraphWriter::new(&mut *self.store, state);
        pass(&mut writer)?;
        let stats = writer.stats();

        self.store
            .commit_transaction()
            .map_err(|e| IndexError::store("commit", e))?;
        self.store
            .optimize_memory()
            .map_err(|e| IndexError::store("optimize", e))?;
        self.phase = SessionPhase::Open;
        info!(
            "indexed {} files, {} symbols, {} references",
            stats.files, stats.symbols, stats.references
        );
        Ok(stats)
    }

    /// Close the store and drop the memos. Closing a closed session is a no-op.
    pub fn close(&mut self) -> IndexResult<()> {
        if self.phase == SessionPhase::Closed {
            return Ok(());
        }
        if self.phase == SessionPhase::Indexing || self.phase == SessionPhase::Clearing {
            warn!("closing session during {:?}; open transaction is discarded", self.phase);
        }
        self.phase = SessionPhase::Closed;
        self.state = None;
        self.store
            .close()
            .map_err(|e| IndexError::store("close", e))?;
        debug!("session closed on {}", self.target.display());
        Ok(())
    }

    fn expect_open(&self) -> IndexResult<()> {
        match self.phase {
            SessionPhase::Open => Ok(()),
            other => Err(IndexError::internal(format!(
                "session must be open, found {:?}",
                other
            ))),
        }
    }
}

impl Drop for IndexSession<'_> {
    fn drop(&mut self) {
        if self.phase != SessionPhase::Closed {
            warn!("session dropped while open; closing {}", self.target.display());
            if let Err(e) = self.close() {
                warn!("failed to close store: {}", e);
            }
        }
    }
}

/// Open, optionally clear, index and close, with close on every path.
///
/// Open failures abort before any indexing work. When both the pass and
/// the close fail, the pass error is returned and the close error logged.
pub fn run_session<F>(
    store: &mut dyn GraphStore,
    target: &Path,
    layout: ModuleLayout,
    clear: bool,
    pass: F,
) -> IndexResult<IndexStats>
where
    F: FnOnce(&mut GraphWriter<'_>) -> IndexResult<()>,
{
    let mut session = IndexSession::new(store, target, layout);
    session.open()?;

    let result = if clear {
        session.clear().and_then(|()| session.index(pass))
    } else {
        session.index(pass)
    };
    let closed = session.close();

    match (result, closed) {
        (Ok(stats), Ok(())) => Ok(stats),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("close after failed pass also failed: {}", close_err);
            Err(e)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DefinitionKind, NameDelimiter, NameHierarchy, SymbolKind};
    use crate::store::MemoryStore;

    fn layout() -> ModuleLayout {
        ModuleLayout::new("/w", "node_modules")
    }

    #[test]
    fn test_phases() {
        let mut store = MemoryStore::new();
        let mut session = IndexSession::new(&mut store, Path::new("mem"), layout());
        assert_eq!(session.phase(), SessionPhase::Closed);
        session.open().unwrap();
        assert_eq!(session.phase(), SessionPhase::Open);
        session.index(|_| Ok(())).unwrap();
        assert_eq!(session.phase(), SessionPhase::Open);
        session.close().unwrap();
        assert_eq!(session.phase(), SessionPhase::Closed);
        session.close().unwrap();
    }

    #[test]
    fn test_index_requires_open_session() {
        let mut store = MemoryStore::new();
        let mut session = IndexSession::new(&mut store, Path::new("mem"), layout());
        assert!(matches!(
            session.index(|_| Ok(())).unwrap_err(),
            IndexError::Internal { .. }
        ));
    }

    #[test]
    fn test_drop_closes_store() {
        let mut store = MemoryStore::new();
        {
            let mut session = IndexSession::new(&mut store, Path::new("mem"), layout());
            session.open().unwrap();
        }
        assert!(!store.is_open());
        assert_eq!(store.stats().closes, 1);
    }

    #[test]
    fn test_clear_resets_symbol_memo() {
        let mut store = MemoryStore::new();
        let h = NameHierarchy::root(NameDelimiter::Scope, "X");
        let mut session = IndexSession::new(&mut store, Path::new("mem"), layout());
        session.open().unwrap();
        session
            .index(|w| {
                w.record_symbol(&h, SymbolKind::GlobalVariable, DefinitionKind::Explicit)?;
                Ok(())
            })
            .unwrap();
        session.clear().unwrap();
        let stats = session
            .index(|w| {
                w.record_symbol(&h, SymbolKind::GlobalVariable, DefinitionKind::Explicit)?;
                Ok(())
            })
            .unwrap();
        session.close().unwrap();
        drop(session);
        assert_eq!(stats.symbols, 1);
        assert_eq!(store.data().symbols.len(), 1);
    }
}
