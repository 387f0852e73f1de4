//! Infrastructure layer for Colloquy.
//!
//! Contains implementations of the gateway traits defined in `colloquy-core`:
//! OpenAI-backed transcription, chat completion and speech synthesis, a
//! file-writing audio sink, audio file loading, and the `config.toml` loader.

pub mod audio;
pub mod config;
pub mod openai;

use std::path::PathBuf;

use colloquy_core::gateway::Gateways;
use colloquy_types::config::OpenAiSettings;
use secrecy::SecretString;

use self::audio::{FileSinkPlayer, NoCapture};
use self::openai::{OpenAiGenerator, OpenAiSynthesizer, OpenAiTranscriber};

/// Assemble the default gateway set: OpenAI for speech and chat, audio
/// written to `output_dir` instead of a speaker, and no live microphone.
pub fn openai_gateways(
    settings: &OpenAiSettings,
    api_key: SecretString,
    output_dir: PathBuf,
) -> Gateways {
    Gateways::new(
        NoCapture::new(),
        OpenAiTranscriber::new(&api_key, settings),
        OpenAiGenerator::new(&api_key, &settings.base_url),
        OpenAiSynthesizer::new(&api_key, settings),
        FileSinkPlayer::new(output_dir),
    )
}
