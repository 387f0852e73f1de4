//! `colloquy config`: print the effective configuration.

use anyhow::Result;
use console::style;

use colloquy_infra::config::DATA_DIR_ENV;
use colloquy_infra::openai::API_KEY_ENV;

use crate::state::AppState;

pub fn show_config(state: &AppState, json: bool) -> Result<()> {
    let api_key_set = std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty());

    if json {
        let value = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "output_dir": state.output_dir.display().to_string(),
            "api_key_set": api_key_set,
            "config": state.config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let session = &state.config.session;
    let openai = &state.config.openai;

    println!();
    println!("  {}", style("── Paths ──").dim());
    println!(
        "  Data dir:    {}  {}",
        state.data_dir.display(),
        style(format!("(${DATA_DIR_ENV})")).dim()
    );
    println!("  Audio out:   {}", state.output_dir.display());
    println!();
    println!("  {}", style("── Session ──").dim());
    println!("  Persona:     {}", style(&session.default_persona).cyan());
    println!("  Retention:   {:?}", session.retention);
    println!(
        "  Capture:     {}s, {} retr{}",
        session.capture_duration_secs,
        session.capture_retries,
        if session.capture_retries == 1 { "y" } else { "ies" }
    );
    let t = &session.timeouts;
    println!(
        "  Timeouts:    transcribe {}s, generate {}s, synthesize {}s, play {}s",
        t.transcribe_secs, t.generate_secs, t.synthesize_secs, t.play_secs
    );
    println!();
    println!("  {}", style("── Backend ──").dim());
    println!("  Base URL:    {}", openai.base_url);
    println!(
        "  Speech:      {} / {} ({})",
        openai.whisper_model, openai.tts_model, openai.tts_voice
    );
    println!(
        "  API key:     {}",
        if api_key_set {
            style("set".to_string()).green()
        } else {
            style(format!("missing (${API_KEY_ENV})")).yellow()
        }
    );
    println!();
    Ok(())
}
