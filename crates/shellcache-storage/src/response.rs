//! Stored response representation

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An HTTP response captured into a cache partition.
///
/// The body is kept out of the serialized metadata so it round-trips
/// byte-identical through the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, normalized to lowercase names
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Bytes,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Create a response stamped with the current time
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Look up a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Sidecar metadata persisted next to the body file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EntryMetadata {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body_len: u64,
    pub stored_at: DateTime<Utc>,
}

impl EntryMetadata {
    pub fn from_response(response: &StoredResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body_len: response.body.len() as u64,
            stored_at: response.stored_at,
        }
    }

    pub fn into_response(self, body: Bytes) -> StoredResponse {
        StoredResponse {
            status: self.status,
            headers: self.headers,
            body,
            stored_at: self.stored_at,
        }
    }
}
