// In-memory blob store
// Objects live for the process lifetime; keys list in lexicographic order

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use hyper::body::Bytes;
use tokio::sync::RwLock;

use super::{Blob, BlobEntry, BlobStore, StorageError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, Blob>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, blob)| BlobEntry {
                key: key.clone(),
                size: blob.data.len() as u64,
                uploaded_at: blob.uploaded_at,
            })
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let blob = Blob {
            data,
            content_type: content_type.to_string(),
            uploaded_at: Some(Utc::now()),
        };
        self.objects.write().await.insert(key.to_string(), blob);
        Ok(())
    }
}
