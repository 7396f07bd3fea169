//! Shared domain types for ChatGuru.
//!
//! This crate contains the core domain types used across the workspace:
//! transcript messages, personas, LLM request/response shapes, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
