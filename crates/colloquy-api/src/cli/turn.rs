//! Non-interactive turn commands: `ask` (text), `listen` (prerecorded
//! audio) and `talk` (the capture device).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use console::style;

use colloquy_core::session::ConversationSession;
use colloquy_infra::audio::load_audio_file;
use colloquy_observe::event_log::spawn_event_logger;
use colloquy_types::error::{CaptureError, TurnError};

use super::render::{print_turn_error, print_turn_result, spinner, turn_result_json};
use crate::state::AppState;

/// Send one text message and print the reply.
pub async fn ask(state: &AppState, text: &str, persona: Option<&str>, json: bool) -> Result<()> {
    let session = state.open_session(persona)?;
    let logger = spawn_event_logger(session.events().subscribe());

    let progress = (!json).then(|| spinner("thinking..."));
    let outcome = session.process_text(text).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    finish(session, logger).await;

    let result = outcome?;
    if json {
        println!("{}", serde_json::to_string_pretty(&turn_result_json(&result))?);
    } else {
        print_turn_result(&result, false);
    }
    Ok(())
}

/// Run one turn per audio file, in order, within a single conversation.
///
/// A failed turn (unreadable file, unintelligible speech) is reported and
/// the remaining files still run; the command fails if any turn failed.
pub async fn listen(
    state: &AppState,
    files: &[PathBuf],
    persona: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = state.open_session(persona)?;
    let logger = spawn_event_logger(session.events().subscribe());

    let mut results = Vec::with_capacity(files.len());
    let mut failures = 0usize;

    for path in files {
        let audio = match load_audio_file(path).await {
            Ok(audio) => audio,
            Err(e) => {
                failures += 1;
                if json {
                    results.push(serde_json::json!({
                        "file": path.display().to_string(),
                        "error": e.to_string(),
                    }));
                } else {
                    eprintln!("\n  {} {e}", style("!").red().bold());
                }
                continue;
            }
        };

        let progress = (!json).then(|| spinner(&format!("listening to {}...", path.display())));
        let outcome = session.process_prerecorded_audio(audio).await;
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }

        match outcome {
            Ok(result) if json => {
                let mut value = turn_result_json(&result);
                value["file"] = serde_json::Value::String(path.display().to_string());
                results.push(value);
            }
            Ok(result) => print_turn_result(&result, true),
            Err(e) => {
                failures += 1;
                if json {
                    results.push(serde_json::json!({
                        "file": path.display().to_string(),
                        "error": e.to_string(),
                        "retryable": e.is_retryable(),
                    }));
                } else {
                    print_turn_error(&e);
                }
            }
        }
    }

    finish(session, logger).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {} file(s) failed", files.len());
    }
    Ok(())
}

/// What the voice loop does after a failed turn.
#[derive(Debug, PartialEq, Eq)]
enum AfterFailure {
    Listen,
    Stop,
}

fn after_failure(err: &TurnError) -> AfterFailure {
    match err {
        TurnError::Capture(CaptureError::DeviceUnavailable(_)) => AfterFailure::Stop,
        e if e.is_retryable() => AfterFailure::Listen,
        _ => AfterFailure::Stop,
    }
}

/// Capture and answer spoken turns until Ctrl+C, a non-retryable failure,
/// or `max_turns` committed turns.
///
/// Unintelligible or otherwise retryable attempts are reported and the loop
/// listens again. Ctrl+C cancels the turn in flight; nothing from it is kept.
pub async fn talk(
    state: &AppState,
    persona: Option<&str>,
    seconds: Option<u64>,
    max_turns: Option<usize>,
    json: bool,
) -> Result<()> {
    let session = state.open_session(persona)?;
    let logger = spawn_event_logger(session.events().subscribe());
    let duration = seconds.map(Duration::from_secs);

    if !json {
        let active = session.active_persona();
        println!(
            "\n  {} Talking to {}. {}\n",
            style("*").cyan().bold(),
            style(&active.name).cyan().bold(),
            style("Press Ctrl+C to stop.").dim()
        );
    }

    let mut results = Vec::new();
    let mut committed = 0usize;
    let mut fatal = None;

    while max_turns.is_none_or(|max| committed < max) {
        let progress = (!json).then(|| spinner("listening..."));
        let turn = session.run_turn(duration);
        tokio::pin!(turn);

        let mut interrupted = false;
        let outcome = tokio::select! {
            outcome = &mut turn => outcome,
            _ = tokio::signal::ctrl_c() => {
                interrupted = true;
                session.cancel_turn();
                turn.await
            }
        };
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }

        match outcome {
            Ok(result) => {
                committed += 1;
                if json {
                    results.push(turn_result_json(&result));
                } else {
                    print_turn_result(&result, true);
                }
            }
            Err(TurnError::Cancelled { .. }) if interrupted => {}
            Err(e) => {
                let next = after_failure(&e);
                if json {
                    results.push(serde_json::json!({
                        "error": e.to_string(),
                        "retryable": e.is_retryable(),
                    }));
                } else if next == AfterFailure::Listen {
                    print_turn_error(&e);
                }
                if next == AfterFailure::Stop {
                    fatal = Some(e);
                    break;
                }
            }
        }
        if interrupted {
            break;
        }
    }

    finish(session, logger).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    match fatal {
        Some(TurnError::Capture(CaptureError::DeviceUnavailable(reason))) => {
            if !json {
                eprintln!(
                    "\n  {} No audio capture device is available: {reason}",
                    style("!").red().bold()
                );
                eprintln!(
                    "  {}\n",
                    style("Use `colloquy listen <files>` for recorded speech or `colloquy chat` to type.")
                        .dim()
                );
            }
            anyhow::bail!("capture device unavailable: {reason}")
        }
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Close the session and let the event logger drain.
async fn finish(session: ConversationSession, logger: tokio::task::JoinHandle<u64>) {
    session.close().await;
    drop(session);
    let _ = logger.await;
}
