//! Project resolution: which files an indexing run covers.
//!
//! `index-project` takes a `tsconfig.json` (or a directory holding one) and
//! expands its `files` / `include` / `exclude` settings. `index-file` takes a
//! single source file whose parent directory becomes the project root.
//!
//! Every failure here is a [`ConfigError`]; it carries compiler-style
//! diagnostic lines and aborts the run before any store is opened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use tsgraph_core::error::IndexError;
use tsgraph_core::registry::normalize_path;

use crate::filter::{collect_source_files, FileFilterSpec, DEFAULT_EXCLUSIONS, DEFAULT_INCLUDE};

/// Config file looked up when a directory is given.
pub const TSCONFIG_FILE: &str = "tsconfig.json";

// ============================================================================
// Errors
// ============================================================================

/// Failure to resolve a project.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("path does not exist: {}", path.display())]
    PathMissing { path: PathBuf },

    #[error("no {} found in {}", TSCONFIG_FILE, dir.display())]
    NotFound { dir: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        diagnostics: Vec<String>,
    },
}

impl ConfigError {
    /// Diagnostic lines to print on stderr.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            ConfigError::PathMissing { path } => vec![format!(
                "error TS5058: The specified path does not exist: '{}'.",
                path.display()
            )],
            ConfigError::NotFound { dir } => vec![format!(
                "error TS5057: Cannot find a tsconfig.json file at the specified directory: '{}'.",
                dir.display()
            )],
            ConfigError::Read { path, source } => vec![format!(
                "error TS5083: Cannot read file '{}': {}.",
                path.display(),
                source
            )],
            ConfigError::Parse { diagnostics, .. } => diagnostics.clone(),
        }
    }
}

impl From<ConfigError> for IndexError {
    fn from(err: ConfigError) -> Self {
        IndexError::config(err.to_string(), err.diagnostics())
    }
}

// ============================================================================
// tsconfig.json
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfigFile {
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    out_dir: Option<String>,
}

/// Blank out comments and trailing commas, keeping every byte offset.
///
/// `tsconfig.json` allows both; serde_json does not. Blanking instead of
/// removing keeps parse error positions pointing into the original text.
pub fn strip_jsonc(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match (b, bytes.get(i + 1)) {
            (b'"', _) => {
                in_string = true;
                i += 1;
            }
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                let end = text[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                for byte in &mut out[i..end] {
                    if *byte != b'\n' {
                        *byte = b' ';
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    // Trailing commas, now that comments are blank.
    let mut in_string = false;
    let mut i = 0;
    while i < out.len() {
        let b = out[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b',' {
            let next = out[i + 1..].iter().find(|c| !c.is_ascii_whitespace());
            if matches!(next, Some(b'}') | Some(b']')) {
                out[i] = b' ';
            }
        }
        i += 1;
    }

    // Only ASCII bytes outside strings were replaced by spaces.
    String::from_utf8_lossy(&out).into_owned()
}

fn parse_tsconfig(path: &Path, text: &str) -> Result<TsConfigFile, ConfigError> {
    let cleaned = strip_jsonc(text);
    if cleaned.trim().is_empty() {
        return Ok(TsConfigFile::default());
    }
    serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        diagnostics: vec![format!(
            "{}({},{}): error TS1005: {}",
            path.display(),
            e.line(),
            e.column(),
            e
        )],
    })
}

// ============================================================================
// Project
// ============================================================================

/// The resolved set of root files for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    root: PathBuf,
    config_path: Option<PathBuf>,
    files: Vec<PathBuf>,
}

impl ProjectConfig {
    /// Resolve a `tsconfig.json` path, or a directory containing one.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathMissing {
                path: path.to_path_buf(),
            });
        }
        let path = normalize_path(path);
        let config_path = if path.is_dir() {
            let candidate = path.join(TSCONFIG_FILE);
            if !candidate.is_file() {
                return Err(ConfigError::NotFound { dir: path });
            }
            candidate
        } else {
            path
        };

        let text = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let config = parse_tsconfig(&config_path, &text)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let files = expand_config(&root, &config_path, &config)?;
        info!(
            "resolved {} with {} root files",
            config_path.display(),
            files.len()
        );
        Ok(ProjectConfig {
            root,
            config_path: Some(config_path),
            files,
        })
    }

    /// A project of exactly one file, rooted at its parent directory.
    pub fn single_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::PathMissing {
                path: path.to_path_buf(),
            });
        }
        let file = normalize_path(path);
        let root = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Ok(ProjectConfig {
            root,
            config_path: None,
            files: vec![file],
        })
    }

    /// Directory the project is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Config file the project came from, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Root files, explicit `files` entries first, then sorted matches.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn expand_config(
    root: &Path,
    config_path: &Path,
    config: &TsConfigFile,
) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files: Vec<PathBuf> = config
        .files
        .iter()
        .flatten()
        .map(|f| normalize_path(&root.join(f)))
        .collect();

    let include = match (&config.include, &config.files) {
        (Some(include), _) => include.clone(),
        (None, None) => vec![DEFAULT_INCLUDE.to_string()],
        (None, Some(_)) => Vec::new(),
    };
    if include.is_empty() {
        return Ok(files);
    }

    let mut exclude = match &config.exclude {
        Some(exclude) => exclude.clone(),
        None => DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
    };
    if let Some(out_dir) = config.compiler_options.as_ref().and_then(|o| o.out_dir.clone()) {
        exclude.push(out_dir);
    }

    let filter = FileFilterSpec::new(&include, &exclude).map_err(|e| ConfigError::Parse {
        path: config_path.to_path_buf(),
        diagnostics: vec![format!("{}: error TS5010: {}", config_path.display(), e)],
    })?;
    let matched = collect_source_files(root, &filter).map_err(|source| ConfigError::Read {
        path: root.to_path_buf(),
        source,
    })?;
    debug!("include patterns matched {} files", matched.len());

    for file in matched {
        if !files.contains(&file) {
            files.push(file);
        }
    }
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================
