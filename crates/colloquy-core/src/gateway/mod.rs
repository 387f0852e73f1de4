//! Gateway traits: the external capabilities a turn pipeline drives.
//!
//! Each gateway is a narrow async interface over one device or service
//! (microphone, speech-to-text, chat completion, text-to-speech, speaker).
//! Traits use native async fn in traits (RPITIT, Rust 2024 edition); the
//! [`boxed`] module provides type-erased wrappers so a session can hold any
//! combination of implementations. Implementations live in `colloquy-infra`.
//!
//! Gateways never retry internally and never swallow errors. Retry, timeout
//! and fallback policy belongs to the pipeline.

pub mod boxed;

use std::future::Future;
use std::time::Duration;

use colloquy_types::audio::AudioBlob;
use colloquy_types::context::ContextMessage;
use colloquy_types::error::{
    CaptureError, GenerationError, PlaybackError, SynthesisError, TranscriptionError,
};
use colloquy_types::persona::PersonaConfig;

pub use boxed::{BoxPlayer, BoxResponseGenerator, BoxSpeechCapture, BoxSynthesizer, BoxTranscriber};

/// Records user speech from an input device.
pub trait SpeechCapture: Send + Sync {
    fn name(&self) -> &str;

    /// Record for up to `duration` and return the captured audio.
    fn capture(
        &self,
        duration: Duration,
    ) -> impl Future<Output = Result<AudioBlob, CaptureError>> + Send;

    /// Release the input device. Called once when the owning session closes.
    fn release(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Converts audio into text.
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe `audio`. May return empty text when nothing was heard.
    fn transcribe(
        &self,
        audio: &AudioBlob,
    ) -> impl Future<Output = Result<String, TranscriptionError>> + Send;
}

/// Produces the assistant reply for one turn.
pub trait ResponseGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a reply to `user_text`.
    ///
    /// `context` holds the prior exchanges visible under the session's
    /// retention policy, oldest first. `persona` supplies the system prompt
    /// and model parameters for this call.
    fn generate(
        &self,
        context: &[ContextMessage],
        persona: &PersonaConfig,
        user_text: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Converts text into speech audio.
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn synthesize(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<AudioBlob, SynthesisError>> + Send;
}

/// Renders audio to an output device.
pub trait Player: Send + Sync {
    fn name(&self) -> &str;

    fn play(&self, audio: &AudioBlob) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    /// Release the output device. Called once when the owning session closes.
    fn release(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// The full set of gateways a session drives its turns through.
pub struct Gateways {
    pub capture: BoxSpeechCapture,
    pub transcriber: BoxTranscriber,
    pub generator: BoxResponseGenerator,
    pub synthesizer: BoxSynthesizer,
    pub player: BoxPlayer,
}

impl Gateways {
    /// Box five concrete gateway implementations.
    pub fn new<C, T, G, S, P>(capture: C, transcriber: T, generator: G, synthesizer: S, player: P) -> Self
    where
        C: SpeechCapture + 'static,
        T: Transcriber + 'static,
        G: ResponseGenerator + 'static,
        S: Synthesizer + 'static,
        P: Player + 'static,
    {
        Self {
            capture: BoxSpeechCapture::new(capture),
            transcriber: BoxTranscriber::new(transcriber),
            generator: BoxResponseGenerator::new(generator),
            synthesizer: BoxSynthesizer::new(synthesizer),
            player: BoxPlayer::new(player),
        }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways")
            .field("capture", &self.capture.name())
            .field("transcriber", &self.transcriber.name())
            .field("generator", &self.generator.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("player", &self.player.name())
            .finish()
    }
}
