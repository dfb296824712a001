// File handlers: list, read, write and multi-file apply

use hyper::body::Bytes;
use serde_json::Value;

use super::request::ApiRequest;
use super::response::Reply;
use super::types::{ApplyPayload, ListPayload, WritePayload, WriteRequest};
use crate::error::ApiError;
use crate::http::mime::content_type_for_path;
use crate::logger;
use crate::storage::BlobStore;

const APPLY_DIFF_GUIDANCE: &str =
    "unified diffs are not supported; send {\"files\": [{\"path\": ..., \"content\": ...}]} with full file contents";

/// `GET /api/list?prefix=`
pub async fn list(req: &ApiRequest, store: &dyn BlobStore) -> Result<Reply, ApiError> {
    let prefix = req.query_param("prefix").unwrap_or_default();
    let items = store.list(prefix).await?;
    Reply::ok(ListPayload { items })
}

/// `GET /api/read?path=`
pub async fn read(req: &ApiRequest, store: &dyn BlobStore) -> Result<Reply, ApiError> {
    let path = req
        .query_param("path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("path required"))?;

    let blob = store
        .get(path)
        .await?
        .ok_or_else(|| ApiError::not_found("not found"))?;

    Ok(Reply::raw(content_type_for_path(path), blob.data))
}

/// `POST /api/write {path, content}`
pub async fn write(req: &ApiRequest, store: &dyn BlobStore) -> Result<Reply, ApiError> {
    let WriteRequest { path, content } = req.json()?;
    let path = path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("path required"))?;

    put_text(store, &path, content.unwrap_or_default()).await?;
    Reply::ok(WritePayload { path })
}

/// `POST /api/apply-diff {files: [{path, content}, ...]}`
///
/// Writes are sequential and not atomic. Entries without a path are skipped,
/// yet `applied` reports the full array length.
pub async fn apply_diff(req: &ApiRequest, store: &dyn BlobStore) -> Result<Reply, ApiError> {
    let body: Value = req.json()?;
    let Some(files) = body.get("files").and_then(Value::as_array) else {
        return Err(ApiError::bad_request(APPLY_DIFF_GUIDANCE));
    };

    for entry in files {
        let Some(path) = entry
            .get("path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
        else {
            logger::log_debug("apply-diff: skipping entry without path");
            continue;
        };
        let content = entry
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        put_text(store, path, content.to_string()).await?;
    }

    Reply::ok(ApplyPayload {
        applied: files.len(),
    })
}

async fn put_text(store: &dyn BlobStore, path: &str, content: String) -> Result<(), ApiError> {
    store
        .put(path, Bytes::from(content), content_type_for_path(path))
        .await?;
    Ok(())
}
