// API reply module
// Successful handler outcomes, converted to HTTP only at the router boundary

use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{build_raw_response, json_response, Envelope, HttpResponse};

#[derive(Debug)]
pub enum Reply {
    /// `{ok: true, ...}` envelope, already serialized
    Json {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// File contents returned verbatim
    Raw {
        content_type: &'static str,
        body: Bytes,
    },
}

impl Reply {
    /// 200 envelope with `payload` flattened next to `ok: true`
    pub fn ok<T: Serialize>(payload: T) -> Result<Self, ApiError> {
        let body = serde_json::to_value(Envelope::success(payload))
            .map_err(|e| ApiError::Internal(format!("failed to serialize response: {e}")))?;
        Ok(Self::Json {
            status: StatusCode::OK,
            body,
        })
    }

    pub const fn raw(content_type: &'static str, body: Bytes) -> Self {
        Self::Raw { content_type, body }
    }

    pub fn into_response(self) -> HttpResponse {
        match self {
            Self::Json { status, body } => json_response(status, &body),
            Self::Raw { content_type, body } => build_raw_response(content_type, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ApplyPayload;

    #[test]
    fn test_ok_envelope() {
        let Reply::Json { status, body } = Reply::ok(ApplyPayload { applied: 2 }).unwrap() else {
            panic!("expected JSON reply");
        };
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"ok": true, "applied": 2}));
    }
}
