// Liveness and deployment endpoints

use chrono::{SecondsFormat, Utc};

use super::response::Reply;
use super::types::PingPayload;
use crate::error::ApiError;

const DEPLOY_PENDING: &str = "deploy is not implemented yet; planned modes are publishing \
     the bucket contents to a static site and promoting a staging prefix to production";

/// `ANY /api/ping`
pub fn ping() -> Result<Reply, ApiError> {
    Reply::ok(PingPayload {
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `POST /api/deploy`
pub fn deploy() -> Result<Reply, ApiError> {
    Err(ApiError::NotImplemented(DEPLOY_PENDING.to_string()))
}
