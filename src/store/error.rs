use std::path::PathBuf;
use thiserror::Error;

/// Errors from component store reads and writes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a JSON object; writing would replace it
    #[error("{} is not a valid component file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize component table: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("component '{0}' already exists")]
    DuplicateKey(String),

    #[error("component '{0}' not found")]
    MissingKey(String),
}
