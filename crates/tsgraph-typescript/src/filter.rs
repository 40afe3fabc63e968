//! Include/exclude filtering for project file collection.
//!
//! Patterns follow `tsconfig.json` conventions and are relative to the
//! directory holding the config file:
//!
//! - Standard glob syntax: `*`, `**`, `?`, `[abc]`; `*` never crosses `/`
//! - A pattern with no wildcard and no extension names a directory and
//!   matches everything below it (`src` behaves like `src/**/*`)
//! - A leading `./` is ignored and `.` names the whole project
//! - Default exclusions (dependency directories) always apply
//!
//! Excluded directories are pruned during the walk, so an excluded
//! `node_modules` tree is never read.

use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Include pattern used when a config names neither `files` nor `include`.
pub const DEFAULT_INCLUDE: &str = "**/*";

/// Directory exclusions that always apply.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Extensions collected from a project (`.d.ts` files end in `ts`).
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Error type for file filter operations.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid glob pattern syntax.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Compiled include and exclude patterns of one project.
#[derive(Debug)]
pub struct FileFilterSpec {
    inclusions: GlobSet,
    exclusions: GlobSet,
    default_exclusions: GlobSet,
}

impl FileFilterSpec {
    /// Compile `include` and `exclude` pattern lists.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        let inclusions = build_glob_set(&expand_patterns(include))?;
        let exclusions = build_glob_set(&expand_patterns(exclude))?;
        let defaults: Vec<String> = DEFAULT_EXCLUSIONS
            .iter()
            .flat_map(|dir| [format!("**/{}", dir), format!("**/{}/**", dir)])
            .collect();
        let default_exclusions = build_glob_set(&defaults)?;
        Ok(FileFilterSpec {
            inclusions,
            exclusions,
            default_exclusions,
        })
    }

    /// Include everything, apply only the default exclusions.
    pub fn default_all() -> Result<Self, FilterError> {
        Self::new(&[DEFAULT_INCLUDE.to_string()], &[])
    }

    /// Whether a file path (relative to the project root) is selected.
    pub fn matches(&self, path: &Path) -> bool {
        !self.is_excluded(path) && self.inclusions.is_match(path)
    }

    /// Whether a relative path is excluded by default or by the user.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.default_exclusions.is_match(path) || self.exclusions.is_match(path)
    }
}

/// Whether `path` has one of the collected source extensions.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Walk `root` and return the selected source files, sorted by path.
pub fn collect_source_files(root: &Path, filter: &FileFilterSpec) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(root) {
                Ok(rel) => !filter.is_excluded(rel),
                Err(_) => false,
            }
        });

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if filter.matches(rel) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    debug!("collected {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// Rewrite tsconfig-style patterns into glob patterns.
fn expand_patterns(patterns: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for raw in patterns {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pattern = trimmed.trim_start_matches("./").trim_end_matches('/');
        if pattern.is_empty() || pattern == "." {
            out.push("**".to_string());
        } else if names_directory(pattern) {
            out.push(pattern.to_string());
            out.push(format!("{}/**", pattern));
        } else {
            out.push(pattern.to_string());
        }
    }
    out
}

fn names_directory(pattern: &str) -> bool {
    let has_wildcard = pattern.contains(['*', '?', '[']);
    let last = pattern.rsplit('/').next().unwrap_or(pattern);
    !has_wildcard && !last.contains('.')
}

/// Build a GlobSet from a list of pattern strings.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| FilterError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| FilterError::InvalidPattern {
        pattern: "<combined>".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Pattern Tests
    // =========================================================================

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_directory_pattern_matches_everything_below() {
            let spec = FileFilterSpec::new(&strings(&["src"]), &[]).unwrap();
            assert!(spec.matches(Path::new("src/a.ts")));
            assert!(spec.matches(Path::new("src/deep/b.ts")));
            assert!(!spec.matches(Path::new("lib/a.ts")));
        }

        #[test]
        fn test_single_star_does_not_cross_directories() {
            let spec = FileFilterSpec::new(&strings(&["src/*.ts"]), &[]).unwrap();
            assert!(spec.matches(Path::new("src/a.ts")));
            assert!(!spec.matches(Path::new("src/deep/b.ts")));
        }

        #[test]
        fn test_exclusion_wins_over_inclusion() {
            let spec =
                FileFilterSpec::new(&strings(&["**/*"]), &strings(&["./dist", "**/*.spec.ts"]))
                    .unwrap();
            assert!(spec.matches(Path::new("src/a.ts")));
            assert!(!spec.matches(Path::new("dist/a.ts")));
            assert!(!spec.matches(Path::new("src/a.spec.ts")));
        }

        #[test]
        fn test_default_exclusions_always_apply() {
            let spec = FileFilterSpec::default_all().unwrap();
            assert!(!spec.matches(Path::new("node_modules/lodash/index.ts")));
            assert!(!spec.matches(Path::new("pkg/bower_components/x.ts")));
            assert!(spec.is_excluded(Path::new("node_modules")));
        }

        #[test]
        fn test_invalid_pattern_is_reported() {
            let err = FileFilterSpec::new(&strings(&["src/[a"]), &[]).unwrap_err();
            let FilterError::InvalidPattern { pattern, .. } = err;
            assert_eq!(pattern, "src/[a");
        }

        #[test]
        fn test_source_extensions() {
            assert!(is_source_file(Path::new("a.ts")));
            assert!(is_source_file(Path::new("a.d.ts")));
            assert!(is_source_file(Path::new("a.tsx")));
            assert!(is_source_file(Path::new("a.mts")));
            assert!(!is_source_file(Path::new("a.js")));
            assert!(!is_source_file(Path::new("README")));
        }
    }

    // =========================================================================
    // Collection Tests
    // =========================================================================

    mod collect_tests {
        use super::*;

        fn workspace() -> TempDir {
            let dir = TempDir::new().unwrap();
            for rel in [
                "src/b.ts",
                "src/a.ts",
                "src/types.d.ts",
                "src/readme.md",
                "node_modules/lodash/index.ts",
                "dist/out.ts",
            ] {
                let path = dir.path().join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, "export {};\n").unwrap();
            }
            dir
        }

        #[test]
        fn test_collect_sorted_and_filtered() {
            let dir = workspace();
            let spec = FileFilterSpec::new(&strings(&["**/*"]), &strings(&["dist"])).unwrap();
            let files = collect_source_files(dir.path(), &spec).unwrap();
            let rel: Vec<_> = files
                .iter()
                .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
                .collect();
            assert_eq!(rel, vec!["src/a.ts", "src/b.ts", "src/types.d.ts"]);
        }

        #[test]
        fn test_collect_empty_when_nothing_matches() {
            let dir = workspace();
            let spec = FileFilterSpec::new(&strings(&["lib"]), &[]).unwrap();
            assert!(collect_source_files(dir.path(), &spec).unwrap().is_empty());
        }
    }
}
