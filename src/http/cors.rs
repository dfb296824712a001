//! CORS decision module
//!
//! Decides once per request whether the caller's `Origin` is allowlisted and
//! stamps the resulting headers onto every response, whatever its route or
//! outcome.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};

use crate::config::Allowlist;

pub const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
pub const ALLOW_HEADERS: &str = "content-type, authorization";
pub const MAX_AGE: &str = "86400";

/// Outcome of the origin check for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsDecision {
    allowed_origin: Option<HeaderValue>,
}

impl CorsDecision {
    /// Evaluate the request's `Origin` header against the allowlist.
    ///
    /// Absent, empty or non-ASCII origins are never allowed.
    pub fn evaluate(allowlist: &Allowlist, origin: Option<&HeaderValue>) -> Self {
        let allowed_origin = origin
            .filter(|value| !value.is_empty())
            .filter(|value| {
                value
                    .to_str()
                    .is_ok_and(|origin| allowlist.contains(origin))
            })
            .cloned();

        Self { allowed_origin }
    }

    pub const fn is_allowed(&self) -> bool {
        self.allowed_origin.is_some()
    }

    /// Write the CORS headers, replacing any a handler may have set.
    ///
    /// `Access-Control-Allow-Origin` is echoed only for allowlisted origins
    /// and removed otherwise.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));

        match &self.allowed_origin {
            Some(origin) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
            None => {
                headers.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
            }
        }
    }
}
