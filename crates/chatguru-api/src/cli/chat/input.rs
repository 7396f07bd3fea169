//! Async line input for the chat loop, backed by `rustyline_async`.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent};

#[derive(Debug)]
pub enum InputEvent {
    /// A submitted line, exactly as typed.
    Message(String),
    /// Ctrl+D.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    pub fn new(prompt: String) -> Result<Self, ReadlineError> {
        let (rl, _writer) = Readline::new(prompt)?;
        Ok(Self { rl })
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                if !line.trim().is_empty() {
                    self.rl.add_history_entry(line.clone());
                }
                InputEvent::Message(line)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(_) => InputEvent::Eof,
        }
    }
}
