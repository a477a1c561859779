//! HTTP/REST API layer for platechat.
//!
//! Axum-based REST API under `/papi/` with an envelope response format and
//! permissive CORS.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
