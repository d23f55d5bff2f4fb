//! Error types for cfgtree

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfgtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cfgtree
///
/// Only load-side failures surface through this type. A failed `save` is
/// logged and swallowed: the in-memory tree stays authoritative until the
/// next successful write.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse persisted configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}
