//! Chat transcript and session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{Message, MessageRole, Usage};
use crate::persona::Persona;

/// One entry in a conversation transcript.
///
/// Serializes as `{"role": "user", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant(String),
}

impl ChatMessage {
    pub fn role(&self) -> MessageRole {
        match self {
            ChatMessage::System(_) => MessageRole::System,
            ChatMessage::User(_) => MessageRole::User,
            ChatMessage::Assistant(_) => MessageRole::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System(text) | ChatMessage::User(text) | ChatMessage::Assistant(text) => {
                text
            }
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, ChatMessage::System(_))
    }
}

impl From<&ChatMessage> for Message {
    fn from(msg: &ChatMessage) -> Self {
        Message {
            role: msg.role(),
            content: msg.content().to_string(),
        }
    }
}

/// Result of submitting one line of user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Input was blank; nothing was appended and the model was not called.
    Skipped,
    /// The model answered and the reply was appended to the transcript.
    Answered {
        reply: String,
        usage: Usage,
        elapsed_ms: u64,
    },
}

/// Summary of a live session, as reported by the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub persona: Persona,
    pub turn_count: u32,
    pub message_count: usize,
    pub started_at: DateTime<Utc>,
}
