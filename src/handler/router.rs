//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS evaluation, preflight
//! answers, body limits, dispatch to the API table, failure shaping and
//! access logging. Every response leaving this module carries CORS headers.

use std::any::Any;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, ORIGIN, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request};

use crate::api::{self, ApiRequest};
use crate::config::AppState;
use crate::error::ApiError;
use crate::http::{build_preflight_response, CorsDecision, HttpResponse};
use crate::logger::{self, AccessLogEntry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let cors = CorsDecision::evaluate(&state.allowlist, parts.headers.get(ORIGIN));

    // 1. Preflight, answered for any path
    // 2. Declared body size
    // 3. Collect and dispatch
    let mut response = if parts.method == Method::OPTIONS {
        build_preflight_response()
    } else if let Some(err) = check_body_size(&parts.headers, state.config.http.max_body_size) {
        err.into_response()
    } else {
        dispatch_guarded(&parts, body, &state).await
    };

    cors.apply(response.headers_mut());

    if state.config.logging.access_log {
        log_access(&parts, &response, &cors, remote_addr, started, &state);
    }
    Ok(response)
}

/// Validate Content-Length header and reject oversized bodies up front
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<ApiError> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(ApiError::PayloadTooLarge)
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

/// Read the whole body, enforcing the limit on chunked uploads too
async fn collect_body<B>(body: B, max_body_size: u64) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(ApiError::PayloadTooLarge),
        Err(e) => Err(ApiError::bad_request(format!("failed to read request body: {e}"))),
    }
}

/// Run the handler, turning errors and panics into envelopes
async fn dispatch_guarded<B>(parts: &Parts, body: B, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let outcome = AssertUnwindSafe(async {
        let body = collect_body(body, state.config.http.max_body_size).await?;
        let req = ApiRequest::new(parts, body);
        api::dispatch(&req, state).await
    })
    .catch_unwind()
    .await
    .unwrap_or_else(|panic| Err(ApiError::Internal(panic_message(panic.as_ref()))));

    match outcome {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            if err.is_server_error() {
                logger::log_error(&format!("{} {}: {err}", parts.method, parts.uri.path()));
            }
            err.into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("handler panicked: {msg}")
    } else {
        "handler panicked".to_string()
    }
}

fn log_access(
    parts: &Parts,
    response: &HttpResponse,
    cors: &CorsDecision,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header_text = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = match parts.version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.origin = header_text(ORIGIN);
    entry.cors_allowed = cors.is_allowed();
    entry.user_agent = header_text(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::{FetchError, FetchedResponse, HttpFetcher};
    use crate::storage::{Blob, BlobEntry, BlobStore, MemoryStore, StorageError};
    use async_trait::async_trait;
    use http_body_util::Full;
    use hyper::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
    };
    use hyper::StatusCode;
    use serde_json::Value;
    use std::collections::BTreeMap;

    const APP_ORIGIN: &str = "https://app.example";

    struct OfflineFetcher;

    #[async_trait]
    impl HttpFetcher for OfflineFetcher {
        async fn get(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            if url.contains("nowhere") {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: "unreachable".to_string(),
                });
            }
            Ok(FetchedResponse {
                status: 200,
                headers: BTreeMap::new(),
            })
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl BlobStore for BrokenStore {
        async fn list(&self, _prefix: &str) -> Result<Vec<BlobEntry>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }

        async fn get(&self, _key: &str) -> Result<Option<Blob>, StorageError> {
            panic!("backend exploded");
        }

        async fn put(&self, _key: &str, _data: Bytes, _ct: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.cors.allowed_origins = format!(r#"["{APP_ORIGIN}"]"#);
        config.logging.access_log = false;
        config.http.max_body_size = 1024;
        config
    }

    fn state_with(store: Arc<dyn BlobStore>) -> Arc<AppState> {
        Arc::new(AppState::new(test_config(), store, Arc::new(OfflineFetcher)))
    }

    fn state() -> Arc<AppState> {
        state_with(Arc::new(MemoryStore::new()))
    }

    fn request(method: Method, uri: &str, origin: Option<&str>, body: &str) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(origin) = origin {
            builder = builder.header(ORIGIN, origin);
        }
        builder
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> HttpResponse {
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(state), addr).await.unwrap()
    }

    async fn json(response: HttpResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors_headers(response: &HttpResponse) {
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_METHODS], "GET,POST,OPTIONS");
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type, authorization"
        );
        assert_eq!(response.headers()[ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[tokio::test]
    async fn test_preflight_any_path() {
        let state = state();
        for path in ["/api/write", "/anything/else"] {
            let response = send(&state, request(Method::OPTIONS, path, Some(APP_ORIGIN), "")).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            assert_cors_headers(&response);
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            assert!(bytes.is_empty());
        }
    }

    #[tokio::test]
    async fn test_origin_echo_only_when_allowed() {
        let state = state();

        let response = send(&state, request(Method::GET, "/api/ping", Some(APP_ORIGIN), "")).await;
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);

        let response = send(&state, request(Method::GET, "/api/ping", Some("https://evil.example"), "")).await;
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_cors_headers(&response);

        let response = send(&state, request(Method::GET, "/api/ping", None, "")).await;
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ping_any_method() {
        let state = state();
        for method in [Method::GET, Method::POST, Method::DELETE] {
            let response = send(&state, request(method, "/api/ping", None, "")).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = json(response).await;
            assert_eq!(body["ok"], true);
            assert!(body["time"].is_string());
        }
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let state = state();
        let response = send(
            &state,
            request(Method::POST, "/api/write", None, r#"{"path":"site/index.html","content":"<h1>Hi</h1>"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, serde_json::json!({"ok": true, "path": "site/index.html"}));

        let response = send(&state, request(Method::GET, "/api/read?path=site/index.html", Some(APP_ORIGIN), "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>Hi</h1>");

        let response = send(&state, request(Method::GET, "/api/list?prefix=site/", None, "")).await;
        let body = json(response).await;
        assert_eq!(body["items"][0]["key"], "site/index.html");
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let state = state();

        let response = send(&state, request(Method::GET, "/api/read", None, "")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await, serde_json::json!({"ok": false, "error": "path required"}));

        let response = send(&state, request(Method::GET, "/api/read?path=missing.txt", None, "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "not found");

        let response = send(&state, request(Method::POST, "/api/write", None, "{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&state, request(Method::POST, "/api/analyze-cors", None, "{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "url required");
    }

    #[tokio::test]
    async fn test_unknown_route_and_method_mismatch() {
        let state = state();
        for (method, path) in [(Method::GET, "/api/nope"), (Method::GET, "/api/write"), (Method::POST, "/api/list"), (Method::GET, "/")] {
            let response = send(&state, request(method, path, Some(APP_ORIGIN), "")).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
            assert_eq!(json(response).await, serde_json::json!({"ok": false, "error": "Route not found"}));
        }
    }

    #[tokio::test]
    async fn test_generate_and_deploy() {
        let state = state();
        let response = send(
            &state,
            request(Method::POST, "/api/generate-html", None, r#"{"prompt":"Hero","section":"hero"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert!(body["html"].as_str().unwrap().contains("<h2>Hero</h2>"));
        assert_eq!(body["js"], "");

        let response = send(&state, request(Method::POST, "/api/deploy", None, "{}")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_cors_headers(&response);
        let body = json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_cors_failure_is_502() {
        let state = state();
        let response = send(
            &state,
            request(Method::POST, "/api/analyze-cors", None, r#"{"url":"https://nowhere.example"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json(response).await;
        assert_eq!(body["error"], "fetch_failed");
        assert!(body["detail"].as_str().unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let state = state();
        let big = format!(r#"{{"path":"a.txt","content":"{}"}}"#, "x".repeat(2048));
        let mut req = request(Method::POST, "/api/write", Some(APP_ORIGIN), &big);
        req.headers_mut().insert(CONTENT_LENGTH, big.len().into());

        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        assert_eq!(json(response).await["error"], "payload_too_large");

        // Without a declared length the collected body is still capped
        let response = send(&state, request(Method::POST, "/api/write", None, &big)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.store().list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let state = state_with(Arc::new(BrokenStore));
        let response = send(&state, request(Method::GET, "/api/list", Some(APP_ORIGIN), "")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        let body = json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "server_error");
        assert!(body["detail"].as_str().unwrap().contains("disk unavailable"));
    }

    #[tokio::test]
    async fn test_handler_panic_is_server_error() {
        let state = state_with(Arc::new(BrokenStore));
        let response = send(&state, request(Method::GET, "/api/read?path=a.txt", None, "")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors_headers(&response);
        let body = json(response).await;
        assert_eq!(body["error"], "server_error");
        assert!(body["detail"].as_str().unwrap().contains("backend exploded"));
    }

    #[tokio::test]
    async fn test_apply_diff_counts_skipped_entries() {
        let state = state();
        let response = send(
            &state,
            request(
                Method::POST,
                "/api/apply-diff",
                Some(APP_ORIGIN),
                r#"{"files":[{"path":"a","content":"1"},{"content":"2"}]}"#,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        assert_eq!(json(response).await, serde_json::json!({"ok": true, "applied": 2}));

        let keys: Vec<String> = state
            .store()
            .list("")
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(keys, vec!["a"]);
        let blob = state.store().get("a").await.unwrap().unwrap();
        assert_eq!(&blob.data[..], b"1");
    }

    #[tokio::test]
    async fn test_upload_key_and_url() {
        const BOUNDARY: &str = "router-test-boundary";
        let state = state();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"my photo.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(ORIGIN, APP_ORIGIN)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Full::new(Bytes::from(body)))
            .unwrap();

        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        assert_cors_headers(&response);

        let body = json(response).await;
        assert_eq!(body["ok"], true);
        let key = body["key"].as_str().unwrap();
        let digits = key
            .strip_prefix("assets/")
            .and_then(|rest| rest.strip_suffix("_my_photo.png"))
            .unwrap();
        assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(body["url"], format!("/assets/{digits}_my_photo.png"));

        let blob = state.store().get(key).await.unwrap().unwrap();
        assert_eq!(&blob.data[..], b"PNGDATA");
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_is_rejected() {
        let state = state();
        let response = send(&state, request(Method::POST, "/api/upload", Some(APP_ORIGIN), "{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], APP_ORIGIN);
        assert_eq!(json(response).await["error"], "multipart/form-data required");
    }
}
