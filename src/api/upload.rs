// Multipart asset upload

use std::convert::Infallible;

use chrono::Utc;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;

use super::request::ApiRequest;
use super::response::Reply;
use super::types::UploadPayload;
use crate::error::ApiError;
use crate::http::mime::OCTET_STREAM;
use crate::storage::BlobStore;

const ASSET_PREFIX: &str = "assets/";
const FILE_FIELD: &str = "file";

/// `POST /api/upload` (multipart form with a `file` field)
pub async fn upload(req: &ApiRequest, store: &dyn BlobStore) -> Result<Reply, ApiError> {
    let content_type = req.header(CONTENT_TYPE).unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        return Err(ApiError::bad_request("multipart/form-data required"));
    }

    let boundary = multer::parse_boundary(content_type).map_err(invalid_multipart)?;
    let body = req.body.clone();
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    // The first field named `file` decides; a plain text value does not count
    let field = loop {
        match multipart.next_field().await.map_err(invalid_multipart)? {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(_) => {}
            None => return Err(ApiError::bad_request("file required")),
        }
    };
    let Some(file_name) = field.file_name().map(ToString::to_string) else {
        return Err(ApiError::bad_request("file required"));
    };
    let declared_type = field
        .content_type()
        .map(ToString::to_string)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    let data = field.bytes().await.map_err(invalid_multipart)?;

    let key = asset_key(Utc::now().timestamp_millis(), &file_name);
    store.put(&key, data, &declared_type).await?;

    let url = asset_url(&key);
    Reply::ok(UploadPayload { key, url })
}

fn invalid_multipart(err: multer::Error) -> ApiError {
    ApiError::bad_request(format!("invalid multipart body: {err}"))
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return FILE_FIELD.to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `assets/<unix-ms>_<sanitized name>`
pub fn asset_key(timestamp_ms: i64, file_name: &str) -> String {
    format!("{ASSET_PREFIX}{timestamp_ms}_{}", sanitize_filename(file_name))
}

/// Public URL of an uploaded asset: `/assets/` plus the key's last segment
pub fn asset_url(key: &str) -> String {
    let basename = key.rsplit('/').next().unwrap_or(key);
    format!("/assets/{basename}")
}
