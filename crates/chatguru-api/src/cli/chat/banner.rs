//! Welcome banner printed when a chat starts.

use console::style;

pub fn print_welcome_banner(persona: &str, model: &str, backend: &str) {
    println!();
    println!("  {}", style("ChatGuru").cyan().bold());
    println!("  {}", style("A local Llama 2 chat assistant").dim());
    println!();
    println!("  {}  {}", style("Persona:").bold(), style(persona).cyan());
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Backend:").bold(), style(backend).dim());
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
