//! Core error types

use thiserror::Error;

use crate::lifecycle::LifecyclePhase;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] shellcache_storage::StorageError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] shellcache_proxy::FetchError),

    #[error("Cannot {operation} while {phase}")]
    Lifecycle {
        phase: LifecyclePhase,
        operation: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Precache of {url} failed: {reason}")]
    Precache { url: String, reason: String },
}
