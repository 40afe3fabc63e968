//! Index options and their precedence.
//!
//! Each option is resolved from, lowest to highest precedence:
//! 1. Built-in default
//! 2. Environment variable
//! 3. CLI flag
//!
//! The resolved [`ConfigValue`] remembers which source won.

use std::path::PathBuf;

use tracing::warn;

use crate::error::{IndexError, IndexResult};

/// Default store file name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "index.tsgraph.json";

/// Directory name that marks a dependency package.
pub const DEFAULT_DEPENDENCY_MARKER: &str = "node_modules";

pub const STORE_ENV: &str = "TSGRAPH_STORE";
pub const CLEAR_ENV: &str = "TSGRAPH_CLEAR";
pub const DEPENDENCY_DIR_ENV: &str = "TSGRAPH_DEPENDENCY_DIR";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From environment variable.
    EnvVar = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Index Options
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --store flag.
    pub store: Option<PathBuf>,
    /// --clear flag; `None` when absent.
    pub clear: Option<bool>,
    /// --dependency-dir flag.
    pub dependency_marker: Option<String>,
}

/// Resolved options for one indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    pub store_path: ConfigValue<PathBuf>,
    pub clear: ConfigValue<bool>,
    pub dependency_marker: ConfigValue<String>,
}

impl IndexOptions {
    /// Resolve against the process environment.
    pub fn resolve(cli: &CliOverrides) -> Self {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(cli: &CliOverrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut store_path =
            ConfigValue::new(PathBuf::from(DEFAULT_STORE_FILE), ConfigSource::Default);
        let mut clear = ConfigValue::new(false, ConfigSource::Default);
        let mut dependency_marker =
            ConfigValue::new(DEFAULT_DEPENDENCY_MARKER.to_string(), ConfigSource::Default);

        // Environment variables
        if let Some(path) = env(STORE_ENV).filter(|v| !v.is_empty()) {
            store_path =
                store_path.merge(ConfigValue::new(PathBuf::from(path), ConfigSource::EnvVar));
        }
        if let Some(raw) = env(CLEAR_ENV) {
            match parse_bool(&raw) {
                Some(value) => clear = clear.merge(ConfigValue::new(value, ConfigSource::EnvVar)),
                None => warn!("ignoring {}={:?}: expected true or false", CLEAR_ENV, raw),
            }
        }
        if let Some(marker) = env(DEPENDENCY_DIR_ENV).filter(|v| !v.is_empty()) {
            dependency_marker =
                dependency_marker.merge(ConfigValue::new(marker, ConfigSource::EnvVar));
        }

        // CLI overrides
        if let Some(path) = &cli.store {
            store_path = store_path.merge(ConfigValue::new(path.clone(), ConfigSource::CliFlag));
        }
        if let Some(value) = cli.clear {
            clear = clear.merge(ConfigValue::new(value, ConfigSource::CliFlag));
        }
        if let Some(marker) = &cli.dependency_marker {
            dependency_marker =
                dependency_marker.merge(ConfigValue::new(marker.clone(), ConfigSource::CliFlag));
        }

        IndexOptions {
            store_path,
            clear,
            dependency_marker,
        }
    }

    /// Reject option values no run could use.
    ///
    /// The dependency marker is compared against single path components, so
    /// it must be a non-empty directory name.
    pub fn validate(&self) -> IndexResult<()> {
        let marker = &self.dependency_marker.value;
        if marker.is_empty() {
            return Err(IndexError::invalid_args("dependency directory name is empty"));
        }
        if marker.contains(['/', '\\']) || marker == "." || marker == ".." {
            return Err(IndexError::invalid_args(format!(
                "dependency directory must be a single directory name, got {:?}",
                marker
            )));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
