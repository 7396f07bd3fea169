//! `chatguru check`: verify the model backend answers.

use anyhow::Result;
use console::style;

use chatguru_infra::llm::test_provider_connection;

use crate::state::AppState;

pub async fn check_backend(state: &AppState, base_url: &str, json: bool) -> Result<()> {
    let provider = state.chat_service.provider();
    let model = &state.chat_service.settings().model;

    if !json {
        println!();
        print!(
            "  Probing {} ({}) at {}... ",
            style(provider.name()).cyan(),
            model,
            style(base_url).dim()
        );
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    let result = test_provider_connection(provider).await;

    if json {
        let body = serde_json::json!({
            "provider": provider.name(),
            "model": model,
            "base_url": base_url,
            "healthy": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match result {
        Ok(()) => println!("{}", style("ok").green().bold()),
        Err(e) => {
            println!("{}", style("FAILED").red().bold());
            eprintln!("  {} {e}", style("!").red().bold());
        }
    }
    println!();
    Ok(())
}
