//! Request handler module
//!
//! Turns raw HTTP requests into API dispatches and wraps every outcome with
//! CORS headers and an access log line.

pub mod router;

pub use router::handle_request;
