//! Shared terminal output for turn results and history.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use colloquy_types::error::TurnError;
use colloquy_types::turn::{Turn, TurnResult};

/// Steady-ticking spinner on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn turn_result_json(result: &TurnResult) -> serde_json::Value {
    json!({
        "turn_id": result.turn_id,
        "persona": result.persona,
        "user_text": result.user_text,
        "ai_text": result.ai_text,
        "audio": result.audio.as_ref().map(|a| a.to_ref()),
        "used_fallback": result.used_fallback(),
        "degradations": result.degradations,
    })
}

/// Print the assistant's reply and any absorbed failures.
pub fn print_turn_result(result: &TurnResult, show_user_text: bool) {
    println!();
    if show_user_text {
        println!("  {} {}", style("You").green().bold(), result.user_text);
    }
    println!("  {} {}", style(&result.persona).cyan().bold(), result.ai_text);
    for degradation in &result.degradations {
        println!(
            "  {} {} degraded: {}",
            style("!").yellow().bold(),
            degradation.stage,
            style(&degradation.reason).dim()
        );
    }
    println!();
}

/// Explain a failed turn attempt, with a hint when trying again may help.
pub fn print_turn_error(err: &TurnError) {
    eprintln!("\n  {} {err}", style("!").red().bold());
    if err.is_retryable() {
        eprintln!("  {}", style("Nothing was added to the conversation; try again.").dim());
    }
    eprintln!();
}

pub fn print_history(turns: &[Turn]) {
    println!();
    if turns.is_empty() {
        println!("  {}", style("No turns yet.").dim());
        println!();
        return;
    }
    for turn in turns {
        let user = turn.user_text.as_deref().unwrap_or_default();
        let ai = turn.ai_text.as_deref().unwrap_or_default();
        println!(
            "  {} {} {}",
            style(format!("#{}", turn.id)).dim(),
            style("You").green().bold(),
            preview(user)
        );
        println!(
            "  {} {} {}",
            style(format!("#{}", turn.id)).dim(),
            style(&turn.persona).cyan().bold(),
            preview(ai)
        );
    }
    println!();
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 100;
    if text.chars().count() > MAX_CHARS {
        let cut: String = text.chars().take(MAX_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
