//! Colloquy CLI entry point.
//!
//! Binary name: `colloquy`
//!
//! Parses CLI arguments, installs tracing, loads configuration, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use colloquy_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::from_verbosity(cli.verbose, cli.quiet);
    tracing_options.otel = cli.otel;
    init_tracing(&tracing_options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "colloquy", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let outcome = run(&cli, &state).await;

    shutdown_tracing();
    outcome
}

async fn run(cli: &Cli, state: &AppState) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Chat { persona } => {
            cli::chat::loop_runner::run_chat_loop(state, persona.as_deref()).await
        }
        Commands::Ask { text, persona } => {
            cli::turn::ask(state, text, persona.as_deref(), cli.json).await
        }
        Commands::Talk {
            persona,
            seconds,
            turns,
        } => cli::turn::talk(state, persona.as_deref(), *seconds, *turns, cli.json).await,
        Commands::Listen { files, persona } => {
            cli::turn::listen(state, files, persona.as_deref(), cli.json).await
        }
        Commands::Personas => cli::persona::list_personas(state, cli.json),
        Commands::Config => cli::config::show_config(state, cli.json),
        Commands::Completions { .. } => Ok(()),
    }
}
