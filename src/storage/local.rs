// Local filesystem blob store
//
// Layout under the configured root:
//   objects/<key>         object bytes
//   meta/<key>.json       content type and upload time

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::{Blob, BlobEntry, BlobStore, StorageError};
use crate::http::mime;

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
    uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.objects_dir().join(key))
    }

    fn meta_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join("meta").join(format!("{key}.json")))
    }

    async fn read_meta(&self, key: &str) -> Result<Option<ObjectMeta>, StorageError> {
        match fs::read(self.meta_path(key)?).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys are relative, slash-separated and may not escape the root
fn validate_key(key: &str) -> Result<(), StorageError> {
    let escapes = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if escapes {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Walk `dir` and collect slash-separated keys relative to `base`
async fn collect_keys(base: &Path, dir: PathBuf) -> Result<Vec<(String, u64)>, StorageError> {
    let mut keys = Vec::new();
    let mut pending = vec![dir];

    while let Some(current) = pending.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let Ok(relative) = path.strip_prefix(base) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let size = entry.metadata().await?.len();
                keys.push((key, size));
            }
        }
    }

    keys.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    Ok(keys)
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>, StorageError> {
        let base = self.objects_dir();
        let mut items = Vec::new();

        for (key, size) in collect_keys(&base, base.clone()).await? {
            if !key.starts_with(prefix) {
                continue;
            }
            let uploaded_at = self.read_meta(&key).await?.map(|m| m.uploaded_at);
            items.push(BlobEntry {
                key,
                size,
                uploaded_at,
            });
        }

        Ok(items)
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        let data = match fs::read(self.object_path(key)?).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let meta = self.read_meta(key).await?;
        Ok(Some(Blob {
            data: Bytes::from(data),
            content_type: meta
                .as_ref()
                .map_or_else(|| mime::OCTET_STREAM.to_string(), |m| m.content_type.clone()),
            uploaded_at: meta.map(|m| m.uploaded_at),
        }))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        let meta_path = self.meta_path(key)?;

        for path in [&object_path, &meta_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&object_path, &data).await?;

        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            uploaded_at: Utc::now(),
        };
        fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;
        Ok(())
    }
}
