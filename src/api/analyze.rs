// CORS advisory probe
//
// Fetches a URL and suggests the CORS headers it is missing. Advisory text
// only; credentials, wildcard and method mismatches are not inspected.

use std::collections::BTreeMap;

use super::request::ApiRequest;
use super::response::Reply;
use super::types::{AnalyzePayload, AnalyzeRequest};
use crate::error::ApiError;
use crate::fetch::HttpFetcher;
use crate::http::cors::{ALLOW_HEADERS, ALLOW_METHODS};
use crate::logger;

const ALL_CLEAR: &str = "CORS headers look fine, or CORS does not apply to this resource \
     (fetch it server-to-server instead of from the browser).";

/// `POST /api/analyze-cors {url}`
pub async fn analyze_cors(req: &ApiRequest, fetcher: &dyn HttpFetcher) -> Result<Reply, ApiError> {
    let AnalyzeRequest { url } = req.json()?;
    let url = url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("url required"))?;

    let fetched = fetcher.get(&url).await.map_err(|e| {
        logger::log_warning(&format!("analyze-cors: fetch of {url} failed: {e}"));
        ApiError::from(e)
    })?;

    let suggestions = suggest(&fetched.headers);
    Reply::ok(AnalyzePayload {
        status: fetched.status,
        headers: fetched.headers,
        suggestions,
    })
}

/// Advisory rules, evaluated independently in a fixed order
pub fn suggest(headers: &BTreeMap<String, String>) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !headers.contains_key("access-control-allow-origin") {
        suggestions.push(
            "Add Access-Control-Allow-Origin, reflecting the caller's Origin or an entry from an allowlist."
                .to_string(),
        );
    }
    if !headers.contains_key("access-control-allow-methods") {
        suggestions.push(format!("Add Access-Control-Allow-Methods: {ALLOW_METHODS}"));
    }
    if !headers.contains_key("access-control-allow-headers") {
        suggestions.push(format!("Add Access-Control-Allow-Headers: {ALLOW_HEADERS}"));
    }

    if suggestions.is_empty() {
        suggestions.push(ALL_CLEAR.to_string());
    }
    suggestions
}
