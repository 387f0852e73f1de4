//! Slash command parsing and execution for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for personas,
//! memory and help.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Empty the session memory.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show committed turns for this session.
    History,
    /// List registered personas.
    Personas,
    /// Switch persona, optionally keeping the conversation so far.
    Persona { name: String, keep_memory: bool },
    /// Unknown or malformed command.
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

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/reset" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/personas" => Some(ChatCommand::Personas),
        "/persona" | "/p" => Some(parse_persona(arg)),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

fn parse_persona(arg: &str) -> ChatCommand {
    let mut name = None;
    let mut keep_memory = false;
    for token in arg.split_whitespace() {
        match token {
            "--keep" | "-k" => keep_memory = true,
            _ if name.is_none() => name = Some(token.to_string()),
            _ => return ChatCommand::Unknown(format!("unexpected argument '{token}'")),
        }
    }
    match name {
        Some(name) => ChatCommand::Persona { name, keep_memory },
        None => ChatCommand::Unknown("/persona requires a name".to_string()),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}                {}", style("/help").cyan(), "Show this help message");
    println!(
        "  {}  {}",
        style("/persona NAME [--keep]").cyan(),
        "Switch persona (--keep preserves the conversation)"
    );
    println!("  {}            {}", style("/personas").cyan(), "List available personas");
    println!("  {}             {}", style("/history").cyan(), "Show conversation history");
    println!("  {}               {}", style("/clear").cyan(), "Forget the conversation so far");
    println!("  {}                {}", style("/quit").cyan(), "End the chat session");
    println!();
    println!(
        "  {}",
        style("Ctrl+C cancels a reply in progress, Ctrl+D exits").dim()
    );
    println!();
}
