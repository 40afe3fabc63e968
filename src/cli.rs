//! CLI front door for indexing.
//!
//! Provides the command helpers behind the `tsgraph` binary:
//! - `index-file` - Index one source file
//! - `index-project` - Index a `tsconfig.json` project
//!
//! ## Resolution Before Persistence
//!
//! The target is resolved to a [`ProjectConfig`] before any store is
//! touched. A resolution failure surfaces as
//! [`IndexError::ConfigResolution`] with one diagnostic line per problem,
//! and the store file is never created. Unusable option values are
//! rejected earlier still, as [`IndexError::InvalidArguments`].
//!
//! ## Error Handling
//!
//! All functions return `IndexResult<T>`; the caller renders the error as
//! JSON and maps it to an exit code via `OutputErrorCode`.

use std::path::{Path, PathBuf};

use tracing::info;
use tsgraph_core::config::{CliOverrides, IndexOptions};
use tsgraph_core::error::IndexResult;
use tsgraph_core::output::IndexResponse;
use tsgraph_core::store::JsonStore;
use tsgraph_typescript::{index_project, ProjectConfig};

/// What to index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    /// One source file; its directory is the project root.
    File(PathBuf),
    /// A `tsconfig.json` file or a directory containing one.
    Project(PathBuf),
}

impl IndexTarget {
    pub fn path(&self) -> &Path {
        match self {
            IndexTarget::File(path) | IndexTarget::Project(path) => path,
        }
    }

    /// Resolve the target to the set of files to index.
    pub fn resolve(&self) -> IndexResult<ProjectConfig> {
        let project = match self {
            IndexTarget::File(path) => ProjectConfig::single_file(path)?,
            IndexTarget::Project(path) => ProjectConfig::resolve(path)?,
        };
        Ok(project)
    }
}

/// Resolve options and target, then index into a JSON store.
pub fn run_index(target: &IndexTarget, overrides: &CliOverrides) -> IndexResult<IndexResponse> {
    let options = IndexOptions::resolve(overrides);
    run_index_with(target, &options)
}

/// Index `target` with already resolved options.
pub fn run_index_with(target: &IndexTarget, options: &IndexOptions) -> IndexResult<IndexResponse> {
    options.validate()?;
    let project = target.resolve()?;
    info!(
        "indexing {} file(s) from {} into {} (store from {:?})",
        project.files().len(),
        project.root().display(),
        options.store_path.value.display(),
        options.store_path.source,
    );

    let mut store = JsonStore::new();
    let stats = index_project(&mut store, &project, options)?;
    Ok(IndexResponse::new(
        options.store_path.value.display().to_string(),
        options.clear.value,
        &stats,
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tsgraph_core::error::{IndexError, OutputErrorCode};

    fn options(store: &Path, clear: bool) -> IndexOptions {
        let cli = CliOverrides {
            store: Some(store.to_path_buf()),
            clear: Some(clear),
            dependency_marker: None,
        };
        IndexOptions::resolve_with(&cli, |_| None)
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_missing_file_is_config_resolution() {
            let dir = TempDir::new().unwrap();
            let target = IndexTarget::File(dir.path().join("nope.ts"));
            let err = target.resolve().unwrap_err();
            assert!(matches!(err, IndexError::ConfigResolution { .. }));
            assert_eq!(err.error_code(), OutputErrorCode::DiagnosticsPresent);
            assert!(!err.diagnostics().is_empty());
        }

        #[test]
        fn test_directory_without_tsconfig() {
            let dir = TempDir::new().unwrap();
            let target = IndexTarget::Project(dir.path().to_path_buf());
            let err = target.resolve().unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::DiagnosticsPresent);
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_resolution_failure_never_creates_store() {
            let dir = TempDir::new().unwrap();
            let store = dir.path().join("out.json");
            let target = IndexTarget::Project(dir.path().join("missing"));
            assert!(run_index_with(&target, &options(&store, false)).is_err());
            assert!(!store.exists());
        }

        #[test]
        fn test_empty_dependency_dir_is_invalid_arguments() {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("a.ts");
            fs::write(&source, "declare const X: number;\n").unwrap();
            let store = dir.path().join("out.json");
            let cli = CliOverrides {
                store: Some(store.clone()),
                clear: None,
                dependency_marker: Some(String::new()),
            };
            let options = IndexOptions::resolve_with(&cli, |_| None);

            let err = run_index_with(&IndexTarget::File(source), &options).unwrap_err();
            assert!(matches!(err, IndexError::InvalidArguments { .. }));
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert!(!store.exists());
        }

        #[test]
        fn test_index_file_reports_counts() {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("a.ts");
            fs::write(&source, "declare const X: number;\n").unwrap();
            let store = dir.path().join("out.json");

            let response =
                run_index_with(&IndexTarget::File(source), &options(&store, true)).unwrap();
            assert_eq!(response.status, "ok");
            assert!(response.cleared);
            assert_eq!(response.files, 1);
            // Module symbol plus X.
            assert_eq!(response.symbols, 2);
            assert!(store.exists());
        }
    }
}
