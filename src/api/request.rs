// Collected request passed to route handlers

use std::collections::HashMap;

use hyper::body::Bytes;
use hyper::header::{AsHeaderName, HeaderMap};
use hyper::http::request::Parts;
use hyper::Method;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A request whose body has been fully read
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Decoded query parameters; the first occurrence of a name wins
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(parts: &Parts, body: Bytes) -> Self {
        let mut query = HashMap::new();
        if let Some(raw) = parts.uri.query() {
            for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                query
                    .entry(name.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers.clone(),
            body,
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Header value as text; non-ASCII values are treated as absent
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body as a JSON document of type `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))
    }
}
