//! `chatguru personas`: list the persona table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatguru_types::persona::Persona;

/// Longest prompt preview shown in the table.
const PROMPT_PREVIEW_CHARS: usize = 60;

/// JSON view of the persona table.
pub fn personas_json() -> serde_json::Value {
    serde_json::Value::Array(
        Persona::ALL
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name(),
                    "prompt": p.prompt(),
                    "default": *p == Persona::default(),
                })
            })
            .collect(),
    )
}

pub fn list_personas(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&personas_json())?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Persona").fg(Color::White),
        Cell::new("System prompt").fg(Color::White),
    ]);

    for persona in Persona::ALL {
        let name = if persona == Persona::default() {
            format!("{} (default)", persona.name())
        } else {
            persona.name().to_string()
        };
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(preview(persona.prompt(), PROMPT_PREVIEW_CHARS)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} Switch in chat with {}",
        style("i").blue().bold(),
        style("/persona <name>").yellow()
    );
    println!();
    Ok(())
}

/// Truncate to `max` characters, adding an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
