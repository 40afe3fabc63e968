//! JSON file store backend.
//!
//! The whole graph is one JSON document. It is read on `open` and written
//! only at `commit_transaction`, through a temp file and a rename, so readers
//! only ever see the state of the last commit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{GraphStore, StoreError, StoreResult, TxState};
use crate::graph::{GraphData, GRAPH_SCHEMA_VERSION};

/// On-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub format_version: u32,
    /// ISO 8601 time of the commit that wrote this document.
    pub indexed_at: String,
    pub graph: GraphData,
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    format_version: u32,
    indexed_at: String,
    graph: &'a GraphData,
}

/// A store persisted as a single JSON file.
#[derive(Debug, Default)]
pub struct JsonStore {
    state: TxState,
    path: Option<PathBuf>,
    compact: bool,
}

impl JsonStore {
    pub fn new() -> Self {
        JsonStore::default()
    }

    /// Path of the document, once opened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current tables.
    pub fn data(&self) -> &GraphData {
        &self.state.data
    }

    /// Read a committed document from disk.
    pub fn load(path: &Path) -> StoreResult<StoreDocument> {
        let bytes = fs::read(path)?;
        let mut document: StoreDocument =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if document.format_version != GRAPH_SCHEMA_VERSION {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "format version {} (expected {})",
                    document.format_version, GRAPH_SCHEMA_VERSION
                ),
            });
        }
        document
            .graph
            .restore_indexes()
            .map_err(|reason| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(document)
    }

    fn persist(&self) -> StoreResult<()> {
        let path = self.path.as_deref().ok_or(StoreError::NotOpen)?;
        let document = StoreDocumentRef {
            format_version: GRAPH_SCHEMA_VERSION,
            indexed_at: format_timestamp(SystemTime::now()),
            graph: &self.state.data,
        };
        let json = if self.compact {
            serde_json::to_vec(&document)?
        } else {
            serde_json::to_vec_pretty(&document)?
        };
        atomic_write(path, &json)?;
        debug!("wrote {} bytes to {}", json.len(), path.display());
        Ok(())
    }
}

impl GraphStore for JsonStore {
    fn open(&mut self, target: &Path) -> StoreResult<()> {
        if self.state.is_open() {
            return Err(StoreError::AlreadyOpen {
                path: target.to_path_buf(),
            });
        }
        let data = if target.exists() {
            Self::load(target)?.graph
        } else {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    return Err(StoreError::Io(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("directory {} does not exist", parent.display()),
                    )));
                }
            }
            GraphData::new()
        };
        self.state.open(target, data)?;
        self.path = Some(target.to_path_buf());
        self.compact = false;
        info!("opened store {}", target.display());
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.state.close()? {
            warn!("closed store with an open transaction; uncommitted changes discarded");
        }
        if let Some(path) = self.path.take() {
            debug!("closed store {}", path.display());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn begin_transaction(&mut self) -> StoreResult<()> {
        self.state.begin()
    }

    fn commit_transaction(&mut self) -> StoreResult<()> {
        self.state.commit()?;
        self.persist()
    }

    fn optimize_memory(&mut self) -> StoreResult<()> {
        self.state.optimize()?;
        self.compact = true;
        let exists = self.path.as_deref().is_some_and(Path::exists);
        if exists {
            self.persist()?;
        }
        Ok(())
    }

    fn tables(&mut self) -> StoreResult<&mut GraphData> {
        self.state.writable()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Write `content` to a temp file next to `path`, then rename over it.
///
/// The temp file name includes PID and timestamp so concurrent writers do
/// not collide on it.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    use std::time::UNIX_EPOCH;

    let pid = std::process::id();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let temp_path = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        pid,
        timestamp
    ));
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn format_timestamp(time: SystemTime) -> String {
    use chrono::{DateTime, Utc};

    let datetime: DateTime<Utc> = time.into();
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NameDelimiter, NameHierarchy, SymbolKind};
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("index.tsgraph.json")
    }

    #[test]
    fn test_nothing_written_before_commit() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let mut store = JsonStore::new();
        store.open(&path).unwrap();
        store.begin_transaction().unwrap();
        store.record_file("/w/a.ts").unwrap();
        assert!(!path.exists());
        store.commit_transaction().unwrap();
        assert!(path.exists());
        store.close().unwrap();
    }

    #[test]
    fn test_reopen_reads_committed_tables() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = JsonStore::new();
        store.open(&path).unwrap();
        store.begin_transaction().unwrap();
        let id = store
            .record_symbol(&NameHierarchy::root(NameDelimiter::Scope, "X"))
            .unwrap();
        store.record_symbol_kind(id, SymbolKind::GlobalVariable).unwrap();
        store.commit_transaction().unwrap();
        store.close().unwrap();

        let mut reopened = JsonStore::new();
        reopened.open(&path).unwrap();
        let symbol = reopened
            .data()
            .symbol_by_hierarchy(&NameHierarchy::root(NameDelimiter::Scope, "X"))
            .unwrap();
        assert_eq!(symbol.kind, Some(SymbolKind::GlobalVariable));
    }

    #[test]
    fn test_uncommitted_changes_are_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = JsonStore::new();
        store.open(&path).unwrap();
        store.begin_transaction().unwrap();
        store.record_file("/w/a.ts").unwrap();
        store.commit_transaction().unwrap();
        store.begin_transaction().unwrap();
        store.record_file("/w/b.ts").unwrap();
        store.close().unwrap();

        let document = JsonStore::load(&path).unwrap();
        assert_eq!(document.graph.files.len(), 1);
        assert_eq!(document.format_version, GRAPH_SCHEMA_VERSION);
        assert!(document.indexed_at.ends_with('Z'));
    }

    #[test]
    fn test_corrupt_document_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonStore::new();
        let err = store.open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(!store.is_open());
    }

    #[test]
    fn test_missing_parent_directory_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("index.json");
        let mut store = JsonStore::new();
        assert!(matches!(store.open(&path).unwrap_err(), StoreError::Io(_)));
    }

    #[test]
    fn test_optimize_rewrites_compact_document() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let mut store = JsonStore::new();
        store.open(&path).unwrap();
        store.begin_transaction().unwrap();
        store.record_file("/w/a.ts").unwrap();
        store.commit_transaction().unwrap();
        store.optimize_memory().unwrap();
        store.close().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(JsonStore::load(&path).is_ok());
    }
}
