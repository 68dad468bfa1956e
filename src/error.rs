use std::io;
use thiserror::Error;

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// IO error from file or directory operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A value could not be encoded, or an entry file could not be decoded.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Key not found in the store.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Key cannot be used as a file name inside the store directory.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, KvError>;
