//! File registry: dedupes source paths into stable file ids.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::graph::FileId;
use crate::store::GraphStore;

// ============================================================================
// Language
// ============================================================================

/// Language tag recorded for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Unknown,
}

impl Language {
    /// Detect from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts" | "mts" | "cts") => Language::TypeScript,
            Some("tsx") => Language::Tsx,
            Some("js" | "mjs" | "cjs" | "jsx") => Language::JavaScript,
            _ => Language::Unknown,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::JavaScript => "javascript",
            Language::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Path Normalization
// ============================================================================

/// Absolute, lexically cleaned form of `path`.
///
/// Relative paths are resolved against the current directory; `.` segments
/// are dropped and `..` pops the previous segment. Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

// ============================================================================
// File Registry
// ============================================================================

/// Memo of the files recorded during one session.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: HashMap<PathBuf, FileId>,
}

impl FileRegistry {
    pub fn new() -> Self {
        FileRegistry::default()
    }

    /// Id for `path`, recording the file and its language on first sight.
    pub fn get_or_create_file<S: GraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        path: &Path,
    ) -> IndexResult<FileId> {
        let normalized = normalize_path(path);
        if let Some(&id) = self.files.get(&normalized) {
            return Ok(id);
        }
        let key = normalized.to_string_lossy();
        let id = store
            .record_file(&key)
            .map_err(|e| IndexError::store("record file", e))?;
        let language = Language::from_path(&normalized);
        store
            .record_file_language(id, language.as_tag())
            .map_err(|e| IndexError::store("record file language", e))?;
        debug!("registered {} as {} ({})", key, id, language.as_tag());
        self.files.insert(normalized, id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
