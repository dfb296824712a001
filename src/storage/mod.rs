//! Blob storage module
//!
//! The gateway talks to its bucket only through [`BlobStore`]. Two backends
//! ship with the crate: an in-process map and a directory on local disk.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt object metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// Listing projection of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    pub key: String,
    pub size: u64,
    #[serde(
        rename = "uploadedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// A stored object with its metadata
#[derive(Debug, Clone)]
pub struct Blob {
    pub data: Bytes,
    pub content_type: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// All entries whose key starts with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>, StorageError>;

    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError>;

    /// Store `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;
}

/// Build the backend selected in configuration
pub fn from_config(config: &StorageConfig) -> Arc<dyn BlobStore> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Local => Arc::new(LocalStore::new(&config.root)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_camel_case_timestamp() {
        let entry = BlobEntry {
            key: "index.html".to_string(),
            size: 12,
            uploaded_at: Some(
                DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["key"], "index.html");
        assert_eq!(json["size"], 12);
        assert_eq!(json["uploadedAt"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_entry_without_timestamp_omits_field() {
        let entry = BlobEntry {
            key: "a".to_string(),
            size: 0,
            uploaded_at: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("uploadedAt").is_none());
    }
}
