//! Gateway error types
//!
//! Every handler returns `Result<Reply, ApiError>`; the error side is turned
//! into the `{ok:false, ...}` envelope only at the router boundary.

use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::http::{json_response, Envelope, HttpResponse};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed caller input
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("payload too large")]
    PayloadTooLarge,

    /// Carried in a `message` field instead of `error`
    #[error("{0}")]
    NotImplemented(String),

    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::FetchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is on our side rather than the caller's
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Internal(_))
    }

    /// Shape the error into its wire envelope
    pub fn into_response(self) -> HttpResponse {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(msg) | Self::NotFound(msg) => ErrorBody {
                error: Some(msg.as_str()),
                detail: None,
                message: None,
            },
            Self::RouteNotFound => ErrorBody {
                error: Some("Route not found"),
                detail: None,
                message: None,
            },
            Self::PayloadTooLarge => ErrorBody {
                error: Some("payload_too_large"),
                detail: None,
                message: None,
            },
            Self::NotImplemented(msg) => ErrorBody {
                error: None,
                detail: None,
                message: Some(msg.as_str()),
            },
            Self::FetchFailed(detail) => ErrorBody {
                error: Some("fetch_failed"),
                detail: Some(detail.clone()),
                message: None,
            },
            Self::Storage(e) => ErrorBody {
                error: Some("server_error"),
                detail: Some(e.to_string()),
                message: None,
            },
            Self::Internal(detail) => ErrorBody {
                error: Some("server_error"),
                detail: Some(detail.clone()),
                message: None,
            },
        };
        json_response(status, &Envelope::failure(body))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(key) => Self::BadRequest(format!("invalid path: {key}")),
            other => Self::Storage(other),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::FetchFailed(err.to_string())
    }
}
