//! HTTP request handlers for the REST API.

pub mod persona;
pub mod session;
