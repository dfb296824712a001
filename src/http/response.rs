//! HTTP response building module
//!
//! Builds the two response shapes the gateway emits: the JSON envelope
//! `{ok, ...fields}` and raw file bodies. CORS headers are stamped later by
//! the router, so nothing here sets them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub type HttpResponse = Response<Full<Bytes>>;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// `{ok, ...payload}` wire envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub const fn success(payload: T) -> Self {
        Self { ok: true, payload }
    }

    pub const fn failure(payload: T) -> Self {
        Self { ok: false, payload }
    }
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            log_build_error("JSON", &e);
            return fallback(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"ok":false,"error":"server_error"}"#,
            );
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status, "")
        })
}

/// Build raw body response with an explicit content type
pub fn build_raw_response(content_type: &str, body: Bytes) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("raw", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR, "")
        })
}

/// Build preflight response: 204 with an empty body
pub fn build_preflight_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("204", &e);
            fallback(StatusCode::NO_CONTENT, "")
        })
}

fn fallback(status: StatusCode, body: &'static str) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    if !body.is_empty() {
        response.headers_mut().insert(
            CONTENT_TYPE,
            hyper::header::HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
    }
    response
}

/// Log response build error
fn log_build_error(kind: &str, error: &dyn std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {kind} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Serialize)]
    struct Saved {
        path: String,
    }

    #[tokio::test]
    async fn test_envelope_flattens_payload() {
        let envelope = Envelope::success(Saved {
            path: "index.html".to_string(),
        });
        let response = json_response(StatusCode::OK, &envelope);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"ok": true, "path": "index.html"}));
    }

    #[tokio::test]
    async fn test_raw_response_keeps_bytes() {
        let response = build_raw_response("image/*", Bytes::from_static(&[0x89, 0x50, 0x4e]));
        assert_eq!(response.headers()[CONTENT_TYPE], "image/*");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], &[0x89, 0x50, 0x4e]);
    }

    #[tokio::test]
    async fn test_preflight_is_empty() {
        let response = build_preflight_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().is_empty());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
