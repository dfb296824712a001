//! Bucket gateway
//!
//! A small HTTP gateway exposing a blob bucket to browser tooling: file
//! listing, reads and writes, multipart asset uploads, a placeholder HTML
//! generator and a CORS advisory probe. Every response carries CORS headers
//! decided against a configured origin allowlist.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod storage;
