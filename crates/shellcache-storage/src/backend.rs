//! Partition store trait

use async_trait::async_trait;

use crate::error::StorageError;
use crate::response::StoredResponse;

/// Partition store trait
///
/// Implementations provide named cache partitions, each mapping request
/// cache keys to stored HTTP responses. Reads and writes are atomic at the
/// granularity of a single entry; there are no cross-entry transactions.
#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// Create a partition if it does not already exist
    async fn open_partition(&self, partition: &str) -> Result<(), StorageError>;

    /// Check whether an entry exists
    async fn contains(&self, partition: &str, key: &str) -> Result<bool, StorageError>;

    /// Read an entry, returning `None` on a miss
    async fn get(&self, partition: &str, key: &str) -> Result<Option<StoredResponse>, StorageError>;

    /// Write an entry, replacing any previous value for the key
    async fn put(
        &self,
        partition: &str,
        key: &str,
        response: &StoredResponse,
    ) -> Result<(), StorageError>;

    /// Enumerate all partition names currently present
    async fn list_partitions(&self) -> Result<Vec<String>, StorageError>;

    /// Delete a partition and everything in it; returns false if absent
    async fn delete_partition(&self, partition: &str) -> Result<bool, StorageError>;
}

/// Compute the cache key for a request: sha256 over method and URL
pub fn cache_key(method: &str, url: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b" ");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate a partition name before it touches the filesystem.
///
/// Names must be non-empty and limited to alphanumerics, `-`, `_` and `.`,
/// which keeps path separators and traversal sequences out.
pub fn validate_partition_name(partition: &str) -> Result<(), StorageError> {
    if partition.is_empty() || partition.len() > 128 {
        return Err(StorageError::InvalidPartition(partition.to_string()));
    }
    if partition.starts_with('.') {
        return Err(StorageError::InvalidPartition(partition.to_string()));
    }
    if !partition
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(StorageError::InvalidPartition(partition.to_string()));
    }
    Ok(())
}

/// Validate a cache key: 64 lowercase hex characters (sha256)
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.len() != 64
        || !key
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
