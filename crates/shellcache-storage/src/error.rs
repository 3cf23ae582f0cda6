//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid partition name: {0}")]
    InvalidPartition(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Corrupt entry metadata: {0}")]
    CorruptMetadata(String),
}
