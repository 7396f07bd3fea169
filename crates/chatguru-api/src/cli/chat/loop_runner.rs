//! Main chat loop.
//!
//! Owns the single `SessionStore` for the terminal session and handles one
//! event at a time: a slash command, or a question sent to the model.

use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use chatguru_core::chat::session::SessionStore;
use chatguru_types::chat::{ChatMessage, TurnOutcome};
use chatguru_types::persona::Persona;

use crate::cli::persona::{list_personas, preview};
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, persona_accent};

/// Run the interactive chat loop until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState, persona: Option<&str>, backend: &str) -> Result<()> {
    let mut store = SessionStore::new();
    if let Some(name) = persona {
        let chosen = store.set_persona(name);
        if Persona::lookup(name).is_none() {
            println!(
                "\n  {} Unknown persona '{}', using {}.",
                style("!").yellow().bold(),
                name,
                style(chosen).cyan()
            );
        }
    }

    let model = state.chat_service.settings().model.clone();
    print_welcome_banner(store.persona().name(), &model, backend);

    let mut renderer = ChatRenderer::new(store.persona());
    let prompt = format!("  {} ", style("Input your question! >").green().bold());
    let mut chat_input = open_input(&prompt)?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
            }
            InputEvent::Message(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(cmd) = commands::parse(trimmed) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Personas => list_personas(false)?,
                        ChatCommand::Persona(Some(name)) => {
                            let chosen = store.set_persona(&name);
                            renderer.set_accent(persona_accent(chosen));
                            print_persona_switch(&name, chosen);
                        }
                        ChatCommand::Persona(None) => {
                            // The picker needs the terminal out of raw mode.
                            drop(chat_input);
                            let picked = pick_persona(store.persona()).await;
                            chat_input = open_input(&prompt)?;
                            if let Some(chosen) = picked? {
                                store.apply_persona(chosen);
                                renderer.set_accent(persona_accent(chosen));
                                print_persona_switch(chosen.name(), chosen);
                            }
                        }
                        ChatCommand::Clear => {
                            let selected = store.persona();
                            store.reset();
                            store.apply_persona(selected);
                            println!(
                                "\n  {} Conversation cleared ({}).\n",
                                style("*").cyan().bold(),
                                style(selected).cyan()
                            );
                        }
                        ChatCommand::History => print_history(&store),
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                let spinner = typing_spinner();
                let outcome = state.chat_service.submit_turn(&mut store, &text).await;
                spinner.finish_and_clear();

                match outcome {
                    Ok(TurnOutcome::Skipped) => {}
                    Ok(TurnOutcome::Answered {
                        reply,
                        usage,
                        elapsed_ms,
                    }) => {
                        println!();
                        println!("  {}", style(store.persona().name()).cyan().bold());
                        println!("{}", renderer.render_final(&reply).trim_end());
                        renderer.print_stats_footer(usage.output_tokens, elapsed_ms, &model);
                        println!();
                    }
                    Err(e) => {
                        warn!(error = %e, "Turn failed");
                        eprintln!("\n  {} {e}", style("!").red().bold());
                        eprintln!(
                            "  {}",
                            style("Your question stays in the history. Ask again, or /exit to quit.").dim()
                        );
                        println!();
                    }
                }
            }
        }
    }

    Ok(())
}

fn open_input(prompt: &str) -> Result<ChatInput> {
    ChatInput::new(prompt.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))
}

fn typing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Bot is typing ...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Arrow-key persona list. `Ok(None)` when the user escapes.
async fn pick_persona(current: Persona) -> Result<Option<Persona>> {
    let default = Persona::ALL.iter().position(|p| *p == current).unwrap_or(0);
    let selection = tokio::task::spawn_blocking(move || {
        let names: Vec<&str> = Persona::ALL.iter().map(|p| p.name()).collect();
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a persona")
            .items(&names)
            .default(default)
            .interact_opt()
    })
    .await??;
    Ok(selection.map(|i| Persona::ALL[i]))
}

fn print_persona_switch(requested: &str, chosen: Persona) {
    if Persona::lookup(requested).is_none() {
        println!(
            "\n  {} Unknown persona '{}', using {}.\n",
            style("!").yellow().bold(),
            requested,
            style(chosen).cyan()
        );
    } else {
        println!("\n  {} Persona: {}\n", style("*").cyan().bold(), style(chosen).cyan());
    }
}

fn print_history(store: &SessionStore) {
    let messages = store.render_view();
    println!();
    if messages.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for msg in messages {
        let label = match msg {
            ChatMessage::User(_) => style("You").green().bold().to_string(),
            ChatMessage::Assistant(_) => style("Bot").cyan().bold().to_string(),
            ChatMessage::System(_) => style("System").dim().to_string(),
        };
        println!("  {} {}", label, preview(msg.content(), 100));
    }
    println!();
}
