//! HTTP protocol layer module
//!
//! Content-type classification, the CORS decision and response builders,
//! independent of any particular route.

pub mod cors;
pub mod mime;
pub mod response;

pub use cors::CorsDecision;
pub use response::{
    build_preflight_response, build_raw_response, json_response, Envelope, HttpResponse,
};
