//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(persona: &str, model: &str, session_id: &str) {
    println!();
    println!("  {} {}", style("~").cyan(), style("Colloquy").cyan().bold());
    println!();
    println!("  {}  {}", style("Persona:").bold(), style(persona).dim());
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
