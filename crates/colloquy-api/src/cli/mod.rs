//! CLI command definitions for the `colloquy` binary.

pub mod chat;
pub mod config;
pub mod persona;
pub mod render;
pub mod turn;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use colloquy_types::config::MAX_STAGE_SECS;

/// Talk to a language model, by text or by recorded speech.
#[derive(Parser)]
#[command(name = "colloquy", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, hide = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive text conversation.
    Chat {
        /// Persona to start with (defaults to the configured one).
        #[arg(long, short)]
        persona: Option<String>,
    },

    /// Send a single message and print the reply.
    Ask {
        /// The message to send.
        text: String,

        #[arg(long, short)]
        persona: Option<String>,
    },

    /// Hold a spoken conversation through the capture device until Ctrl+C.
    Talk {
        #[arg(long, short)]
        persona: Option<String>,

        /// Seconds to record per turn (defaults to the configured duration).
        #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..=MAX_STAGE_SECS as i64))]
        seconds: Option<u64>,

        /// Stop after this many committed turns.
        #[arg(long, short = 'n')]
        turns: Option<usize>,
    },

    /// Run one turn per prerecorded audio file, in order, in one conversation.
    Listen {
        /// Audio files (wav, mp3, ogg, flac, m4a, webm).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, short)]
        persona: Option<String>,
    },

    /// List available personas.
    Personas,

    /// Show the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_persona() {
        let cli = Cli::try_parse_from(["colloquy", "ask", "hello there", "-p", "creative"]).unwrap();
        match cli.command {
            Commands::Ask { text, persona } => {
                assert_eq!(text, "hello there");
                assert_eq!(persona.as_deref(), Some("creative"));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_listen_requires_files() {
        assert!(Cli::try_parse_from(["colloquy", "listen"]).is_err());

        let cli = Cli::try_parse_from(["colloquy", "--json", "listen", "a.wav", "b.mp3"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Listen { files, persona } => {
                assert_eq!(files, vec![PathBuf::from("a.wav"), PathBuf::from("b.mp3")]);
                assert!(persona.is_none());
            }
            _ => panic!("expected listen"),
        }
    }

    #[test]
    fn test_parse_talk() {
        let cli = Cli::try_parse_from(["colloquy", "talk", "-s", "8", "-n", "3"]).unwrap();
        match cli.command {
            Commands::Talk {
                persona,
                seconds,
                turns,
            } => {
                assert!(persona.is_none());
                assert_eq!(seconds, Some(8));
                assert_eq!(turns, Some(3));
            }
            _ => panic!("expected talk"),
        }

        assert!(Cli::try_parse_from(["colloquy", "talk", "--seconds", "0"]).is_err());
        assert!(Cli::try_parse_from(["colloquy", "talk", "--seconds", "86400"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["colloquy", "personas", "-vv", "--quiet"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Personas));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
