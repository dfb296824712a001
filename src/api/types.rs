// API request/response types
// Typed JSON bodies for each route

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::BlobEntry;

// ============== Request bodies ==============

/// `POST /api/write`
#[derive(Debug, Default, Deserialize)]
pub struct WriteRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// `POST /api/generate-html`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

/// `POST /api/analyze-cors`
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

// ============== Success payloads ==============
// Each is flattened into the `{ok: true, ...}` envelope.

#[derive(Debug, Serialize)]
pub struct PingPayload {
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct ListPayload {
    pub items: Vec<BlobEntry>,
}

#[derive(Debug, Serialize)]
pub struct WritePayload {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyPayload {
    /// Length of the submitted `files` array, skipped entries included
    pub applied: usize,
}

/// Placeholder markup returned by the HTML generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSnippet {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzePayload {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadPayload {
    pub key: String,
    pub url: String,
}
