//! Shellcache Storage Layer
//!
//! This crate provides partition storage for shellcache: named, versioned
//! key-value partitions mapping request cache keys to stored HTTP responses.

pub mod backend;
pub mod error;
pub mod local;
pub mod response;

pub use backend::PartitionStore;
pub use error::StorageError;
pub use local::LocalPartitions;
pub use response::StoredResponse;
