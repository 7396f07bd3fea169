//! HTTP/REST API layer for ChatGuru.
//!
//! Axum-based REST API at `/api/v1/` with an envelope response format and
//! CORS support. Sessions live in memory for the life of the process.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
