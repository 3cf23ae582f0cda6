//! Local disk partition backend

use bytes::Bytes;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{PartitionStore, validate_key, validate_partition_name};
use crate::error::StorageError;
use crate::response::{EntryMetadata, StoredResponse};

/// Local disk partition backend
///
/// Each partition is a directory under the base path; entries are sharded by
/// the first two characters of the cache key:
/// `<base_path>/<partition>/<shard>/<key>.json` (metadata) and `<key>.bin`
/// (body bytes, verbatim).
pub struct LocalPartitions {
    base_path: PathBuf,
}

impl LocalPartitions {
    /// Create a new local backend rooted at `base_path`
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await?;

        info!("Initialized partition storage at {:?}", base_path);

        Ok(Self { base_path })
    }

    fn partition_path(&self, partition: &str) -> Result<PathBuf, StorageError> {
        validate_partition_name(partition)?;
        Ok(self.base_path.join(partition))
    }

    fn entry_paths(&self, partition: &str, key: &str) -> Result<(PathBuf, PathBuf), StorageError> {
        validate_key(key)?;
        let shard = &key[..2];
        let dir = self.partition_path(partition)?.join(shard);
        Ok((
            dir.join(format!("{key}.json")),
            dir.join(format!("{key}.bin")),
        ))
    }
}

#[async_trait]
impl PartitionStore for LocalPartitions {
    async fn open_partition(&self, partition: &str) -> Result<(), StorageError> {
        let path = self.partition_path(partition)?;
        if !path.exists() {
            debug!("Creating partition directory {:?}", path);
            fs::create_dir_all(&path).await?;
        }
        Ok(())
    }

    async fn contains(&self, partition: &str, key: &str) -> Result<bool, StorageError> {
        let (meta_path, body_path) = self.entry_paths(partition, key)?;
        Ok(meta_path.exists() && body_path.exists())
    }

    async fn get(&self, partition: &str, key: &str) -> Result<Option<StoredResponse>, StorageError> {
        let (meta_path, body_path) = self.entry_paths(partition, key)?;

        let meta_bytes = match fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let meta: EntryMetadata = serde_json::from_slice(&meta_bytes)
            .map_err(|e| StorageError::CorruptMetadata(format!("{key}: {e}")))?;

        let body = match fs::read(&body_path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Metadata without a body is a torn write; treat as a miss.
                debug!("Entry {} has metadata but no body, dropping", key);
                let _ = fs::remove_file(&meta_path).await;
                return Ok(None);
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        if body.len() as u64 != meta.body_len {
            return Err(StorageError::CorruptMetadata(format!(
                "{key}: body length {} does not match recorded {}",
                body.len(),
                meta.body_len
            )));
        }

        Ok(Some(meta.into_response(body)))
    }

    async fn put(
        &self,
        partition: &str,
        key: &str,
        response: &StoredResponse,
    ) -> Result<(), StorageError> {
        let (meta_path, body_path) = self.entry_paths(partition, key)?;
        debug!("Writing entry {} to partition {}", key, partition);

        if let Some(parent) = meta_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Body first, metadata last; a torn write leaves an entry that get()
        // treats as a miss rather than serving a truncated body.
        let body_tmp = body_path.with_extension("bin.tmp");
        fs::write(&body_tmp, &response.body).await?;
        fs::rename(&body_tmp, &body_path).await?;

        let meta = EntryMetadata::from_response(response);
        let meta_bytes =
            serde_json::to_vec(&meta).map_err(|e| StorageError::CorruptMetadata(e.to_string()))?;
        let meta_tmp = meta_path.with_extension("json.tmp");
        fs::write(&meta_tmp, &meta_bytes).await?;
        fs::rename(&meta_tmp, &meta_path).await?;

        Ok(())
    }

    async fn list_partitions(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, StorageError> {
        let path = self.partition_path(partition)?;
        debug!("Deleting partition {:?}", path);

        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
