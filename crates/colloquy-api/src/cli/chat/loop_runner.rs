//! Main chat loop orchestration.
//!
//! Opens a session, prints the banner, then alternates between reading a
//! line and running it as a text turn. While a turn runs, input is still
//! polled so Ctrl+C can cancel it.

use console::style;

use colloquy_core::session::ConversationSession;
use colloquy_observe::event_log::spawn_event_logger;
use colloquy_types::error::{SessionError, TurnError};
use colloquy_types::turn::TurnResult;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{Line, LineReader};
use crate::cli::render::{print_history, print_turn_error, print_turn_result, spinner};
use crate::state::AppState;

enum Flow {
    Continue,
    Exit,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState, persona: Option<&str>) -> anyhow::Result<()> {
    let session = state.open_session(persona)?;
    let logger = spawn_event_logger(session.events().subscribe());

    let active = session.active_persona();
    print_welcome_banner(&active.name, &active.model.model_id, &session.id().to_string());

    let (mut reader, _writer) = LineReader::open(&active.name)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match reader.next_line().await {
            Line::Hangup => break,
            Line::Blank => continue,
            Line::Interrupt => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
            }
            Line::Text(text) => {
                if let Some(cmd) = commands::parse(&text) {
                    match handle_command(&session, state, &mut reader, cmd) {
                        Flow::Continue => continue,
                        Flow::Exit => break,
                    }
                }

                let (outcome, exit_requested) = run_text_turn(&session, &mut reader, &text).await;
                match outcome {
                    Ok(result) => print_turn_result(&result, false),
                    Err(TurnError::Cancelled { .. }) => {
                        println!("\n  {}\n", style("Cancelled.").dim());
                    }
                    Err(e) => print_turn_error(&e),
                }
                if exit_requested {
                    break;
                }
            }
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    reader.close();

    session.close().await;
    drop(session);
    let _ = logger.await;
    Ok(())
}

/// Run one text turn, cancelling it on Ctrl+C (or Ctrl+D, which also exits).
async fn run_text_turn(
    session: &ConversationSession,
    input: &mut LineReader,
    text: &str,
) -> (Result<TurnResult, TurnError>, bool) {
    let progress = spinner("thinking...");
    let turn = session.process_text(text);
    tokio::pin!(turn);

    let mut exit_requested = false;
    let outcome = loop {
        tokio::select! {
            outcome = &mut turn => break outcome,
            line = input.next_line() => match line {
                Line::Interrupt => {
                    session.cancel_turn();
                }
                Line::Hangup => {
                    exit_requested = true;
                    session.cancel_turn();
                }
                // Type-ahead while a reply is pending is dropped.
                Line::Text(_) | Line::Blank => {}
            },
        }
    };

    progress.finish_and_clear();
    (outcome, exit_requested)
}

fn handle_command(
    session: &ConversationSession,
    state: &AppState,
    input: &mut LineReader,
    cmd: ChatCommand,
) -> Flow {
    match cmd {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Exit => return Flow::Exit,
        ChatCommand::History => print_history(&session.history()),
        ChatCommand::Clear => match session.clear() {
            Ok(()) => println!("\n  {} Conversation cleared.\n", style("*").cyan().bold()),
            Err(e) => print_session_error(&e, state),
        },
        ChatCommand::Personas => {
            let active = session.active_persona();
            println!();
            for name in state.registry.names() {
                if name == active.name {
                    println!("  {} {}", style("*").cyan().bold(), style(name).cyan());
                } else {
                    println!("    {name}");
                }
            }
            println!();
        }
        ChatCommand::Persona { name, keep_memory } => {
            match session.switch_persona(&name, keep_memory) {
                Ok(()) => {
                    let note = if keep_memory {
                        "conversation kept"
                    } else {
                        "conversation cleared"
                    };
                    println!(
                        "\n  {} Now talking to {} ({})\n",
                        style("*").cyan().bold(),
                        style(&name).cyan().bold(),
                        style(note).dim()
                    );
                    input.set_persona(&name);
                }
                Err(e) => print_session_error(&e, state),
            }
        }
        ChatCommand::Unknown(what) => {
            println!(
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(what).dim()
            );
        }
    }
    Flow::Continue
}

fn print_session_error(err: &SessionError, state: &AppState) {
    println!("\n  {} {err}", style("!").red().bold());
    if let SessionError::PersonaNotFound(_) = err {
        println!(
            "  {} {}",
            style("Available:").dim(),
            state.registry.names().join(", ")
        );
    }
    println!();
}
