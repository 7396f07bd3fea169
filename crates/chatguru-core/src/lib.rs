//! Business logic and port definitions for ChatGuru.
//!
//! This crate owns the conversation state (`SessionStore`), the turn
//! orchestration (`ChatService`), and the `LlmProvider` port that the
//! infrastructure layer implements. It depends only on `chatguru-types` --
//! never on `chatguru-infra` or any network crate.

pub mod chat;
pub mod llm;
