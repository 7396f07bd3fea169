//! Conversation state and turn handling.
//!
//! - `SessionStore`: the transcript of one conversation plus its persona
//! - `ChatService`: runs a user turn through the inference backend
//! - `SessionRegistry`: host-owned map of live sessions for multi-user hosts

pub mod registry;
pub mod service;
pub mod session;
