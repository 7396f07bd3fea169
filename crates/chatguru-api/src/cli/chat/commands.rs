//! Slash command parsing for the chat loop.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Switch persona; `None` opens the selection list.
    Persona(Option<String>),
    /// List the persona table.
    Personas,
    /// Clear the conversation, keeping the selected persona.
    Clear,
    History,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts
        .next()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/persona" | "/p" => Some(ChatCommand::Persona(arg)),
        "/personas" => Some(ChatCommand::Personas),
        "/clear" | "/reset" => Some(ChatCommand::Clear),
        "/history" => Some(ChatCommand::History),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/persona [name]", "Switch persona (no name opens a list)"),
        ("/personas", "List available personas"),
        ("/clear", "Clear the conversation"),
        ("/history", "Show the conversation so far"),
        ("/exit", "End the chat session"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (cmd, desc) in rows {
        println!("  {:<18} {}", style(cmd).cyan(), desc);
    }
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit, Ctrl+C is safe (no message loss)").dim()
    );
    println!();
}
