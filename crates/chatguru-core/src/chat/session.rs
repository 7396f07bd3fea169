//! Session store for a single conversation.
//!
//! Holds the transcript that is sent verbatim to the model on every turn.
//! Index 0 is always the one system message; persona changes replace its
//! payload and never touch the rest of the history.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatguru_types::chat::{ChatMessage, SessionSummary};
use chatguru_types::error::ChatError;
use chatguru_types::llm::Message;
use chatguru_types::persona::{DEFAULT_SYSTEM_PROMPT, Persona};

/// Transcript and persona of one conversation.
///
/// Owned exclusively by whoever hosts the session (the terminal loop or the
/// HTTP registry); there is no interior mutability.
#[derive(Debug, Clone)]
pub struct SessionStore {
    id: Uuid,
    persona: Persona,
    transcript: Vec<ChatMessage>,
    /// Completed user+assistant exchanges since the last reset.
    turn_count: u32,
    started_at: DateTime<Utc>,
}

impl SessionStore {
    /// Create a fresh session holding only the default system prompt.
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            persona: Persona::General,
            transcript: vec![ChatMessage::System(DEFAULT_SYSTEM_PROMPT.to_string())],
            turn_count: 0,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Drop the whole history and start over with the default system prompt.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.transcript
            .push(ChatMessage::System(DEFAULT_SYSTEM_PROMPT.to_string()));
        self.persona = Persona::General;
        self.turn_count = 0;
    }

    /// Switch persona by name. Unknown names resolve to [`Persona::General`].
    ///
    /// Returns the persona that was actually applied.
    pub fn set_persona(&mut self, name: &str) -> Persona {
        let persona = Persona::resolve(name);
        self.apply_persona(persona);
        persona
    }

    /// Replace the system prompt with `persona`'s prompt.
    pub fn apply_persona(&mut self, persona: Persona) {
        debug_assert!(self.transcript.first().is_some_and(ChatMessage::is_system));
        self.transcript[0] = ChatMessage::System(persona.prompt().to_string());
        self.persona = persona;
    }

    /// Append a user message. Blank text is rejected with [`ChatError::EmptyInput`].
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<(), ChatError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.transcript.push(ChatMessage::User(text));
        Ok(())
    }

    /// Append the model's reply and count the exchange.
    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(ChatMessage::Assistant(text.into()));
        self.turn_count += 1;
    }

    /// The full transcript, system message first.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// The transcript as displayed to the user (system message excluded).
    pub fn render_view(&self) -> &[ChatMessage] {
        &self.transcript[1..]
    }

    /// The transcript in the shape the inference backend expects.
    pub fn to_llm_messages(&self) -> Vec<Message> {
        self.transcript.iter().map(Message::from).collect()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            persona: self.persona,
            turn_count: self.turn_count,
            message_count: self.transcript.len(),
            started_at: self.started_at,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatguru_types::llm::MessageRole;

    fn store_with_history() -> SessionStore {
        let mut store = SessionStore::new();
        store.append_user("What's for dinner?").unwrap();
        store.append_assistant("Pasta.");
        store.append_user("And dessert?").unwrap();
        store
    }

    #[test]
    fn test_new_session_has_default_system_prompt() {
        let store = SessionStore::new();
        assert_eq!(
            store.snapshot(),
            &[ChatMessage::System(DEFAULT_SYSTEM_PROMPT.to_string())]
        );
        assert_eq!(store.persona(), Persona::General);
        assert_eq!(store.turn_count(), 0);
        assert!(store.render_view().is_empty());
    }

    #[test]
    fn test_set_persona_only_touches_system_message() {
        for persona in Persona::ALL {
            let mut store = store_with_history();
            let tail_before = store.snapshot()[1..].to_vec();

            store.set_persona(persona.name());

            assert_eq!(
                store.snapshot()[0],
                ChatMessage::System(persona.prompt().to_string())
            );
            assert_eq!(store.snapshot()[1..], tail_before[..]);
            assert_eq!(store.persona(), persona);
        }
    }

    #[test]
    fn test_unknown_persona_matches_general() {
        let mut a = store_with_history();
        let mut b = store_with_history();
        a.set_persona("Nonexistent");
        b.set_persona("General");
        assert_eq!(a.snapshot()[0], b.snapshot()[0]);
        assert_eq!(a.persona(), Persona::General);
    }

    #[test]
    fn test_set_persona_idempotent() {
        let mut store = store_with_history();
        store.set_persona("Travel Planner");
        let once = store.snapshot().to_vec();
        store.set_persona("Travel Planner");
        assert_eq!(store.snapshot(), &once[..]);
    }

    #[test]
    fn test_append_user_rejects_blank() {
        let mut store = SessionStore::new();
        assert!(matches!(store.append_user(""), Err(ChatError::EmptyInput)));
        assert!(matches!(store.append_user("  \t\n"), Err(ChatError::EmptyInput)));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_append_order_and_turn_count() {
        let mut store = SessionStore::new();
        store.append_user("hi").unwrap();
        store.append_assistant("hello");
        assert_eq!(
            &store.snapshot()[1..],
            &[
                ChatMessage::User("hi".to_string()),
                ChatMessage::Assistant("hello".to_string()),
            ]
        );
        assert_eq!(store.turn_count(), 1);
    }

    #[test]
    fn test_reset_restores_single_default_message() {
        let mut store = store_with_history();
        store.set_persona("Creative Writer");
        store.append_assistant("Tiramisu.");

        store.reset();

        assert_eq!(
            store.snapshot(),
            &[ChatMessage::System(DEFAULT_SYSTEM_PROMPT.to_string())]
        );
        assert_eq!(store.persona(), Persona::General);
        assert_eq!(store.turn_count(), 0);
    }

    #[test]
    fn test_reset_keeps_session_identity() {
        let mut store = store_with_history();
        let id = store.id();
        store.reset();
        assert_eq!(store.id(), id);
    }

    #[test]
    fn test_render_view_excludes_system() {
        let store = store_with_history();
        let view = store.render_view();
        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|m| !m.is_system()));
    }

    #[test]
    fn test_to_llm_messages_preserves_roles_in_order() {
        let store = store_with_history();
        let roles: Vec<MessageRole> = store.to_llm_messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
    }

    #[test]
    fn test_summary_reports_counts() {
        let mut store = store_with_history();
        store.set_persona("Kitchen Helper");
        let summary = store.summary();
        assert_eq!(summary.id, store.id());
        assert_eq!(summary.persona, Persona::KitchenHelper);
        assert_eq!(summary.turn_count, 1);
        assert_eq!(summary.message_count, 4);
    }
}
