//! Error types for reqsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from parsing a dependency manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A package name appears on more than one line.
    #[error("duplicate package '{name}' on line {line}")]
    DuplicatePackage { name: String, line: usize },

    /// A non-comment line with no package name (e.g. a bare `==1.0`).
    #[error("malformed manifest entry on line {line}: '{text}'")]
    MalformedEntry { line: usize, text: String },
}
