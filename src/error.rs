use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading settings, rules or level files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level layout: {0}")]
    InvalidLayout(String),
    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

/// Failures of the best-score store. Callers log these and carry on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("score file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file format: {0}")]
    Format(#[from] serde_json::Error),
}
