//! Object-safe dynamic dispatch wrappers for the gateway traits.
//!
//! Each gateway follows the same blanket-impl pattern:
//! 1. Define an object-safe `XxxDyn` trait with boxed futures
//! 2. Blanket-impl `XxxDyn` for all `T: Xxx`
//! 3. `BoxXxx` wraps `Box<dyn XxxDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use colloquy_types::audio::AudioBlob;
use colloquy_types::context::ContextMessage;
use colloquy_types::error::{
    CaptureError, GenerationError, PlaybackError, SynthesisError, TranscriptionError,
};
use colloquy_types::persona::PersonaConfig;

use super::{Player, ResponseGenerator, SpeechCapture, Synthesizer, Transcriber};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// --- SpeechCapture ---

/// Object-safe version of [`SpeechCapture`].
pub trait SpeechCaptureDyn: Send + Sync {
    fn name(&self) -> &str;
    fn capture_boxed(&self, duration: Duration) -> BoxFuture<'_, Result<AudioBlob, CaptureError>>;
    fn release_boxed(&self) -> BoxFuture<'_, ()>;
}

impl<T: SpeechCapture> SpeechCaptureDyn for T {
    fn name(&self) -> &str {
        SpeechCapture::name(self)
    }

    fn capture_boxed(&self, duration: Duration) -> BoxFuture<'_, Result<AudioBlob, CaptureError>> {
        Box::pin(self.capture(duration))
    }

    fn release_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(SpeechCapture::release(self))
    }
}

/// Type-erased speech capture device.
pub struct BoxSpeechCapture {
    inner: Box<dyn SpeechCaptureDyn + Send + Sync>,
}

impl BoxSpeechCapture {
    pub fn new<T: SpeechCapture + 'static>(capture: T) -> Self {
        Self {
            inner: Box::new(capture),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn capture(&self, duration: Duration) -> Result<AudioBlob, CaptureError> {
        self.inner.capture_boxed(duration).await
    }

    pub async fn release(&self) {
        self.inner.release_boxed().await
    }
}

// --- Transcriber ---

/// Object-safe version of [`Transcriber`].
pub trait TranscriberDyn: Send + Sync {
    fn name(&self) -> &str;
    fn transcribe_boxed<'a>(
        &'a self,
        audio: &'a AudioBlob,
    ) -> BoxFuture<'a, Result<String, TranscriptionError>>;
}

impl<T: Transcriber> TranscriberDyn for T {
    fn name(&self) -> &str {
        Transcriber::name(self)
    }

    fn transcribe_boxed<'a>(
        &'a self,
        audio: &'a AudioBlob,
    ) -> BoxFuture<'a, Result<String, TranscriptionError>> {
        Box::pin(self.transcribe(audio))
    }
}

/// Type-erased transcription service.
pub struct BoxTranscriber {
    inner: Box<dyn TranscriberDyn + Send + Sync>,
}

impl BoxTranscriber {
    pub fn new<T: Transcriber + 'static>(transcriber: T) -> Self {
        Self {
            inner: Box::new(transcriber),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn transcribe(&self, audio: &AudioBlob) -> Result<String, TranscriptionError> {
        self.inner.transcribe_boxed(audio).await
    }
}

// --- ResponseGenerator ---

/// Object-safe version of [`ResponseGenerator`].
pub trait ResponseGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;
    fn generate_boxed<'a>(
        &'a self,
        context: &'a [ContextMessage],
        persona: &'a PersonaConfig,
        user_text: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerationError>>;
}

impl<T: ResponseGenerator> ResponseGeneratorDyn for T {
    fn name(&self) -> &str {
        ResponseGenerator::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        context: &'a [ContextMessage],
        persona: &'a PersonaConfig,
        user_text: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(self.generate(context, persona, user_text))
    }
}

/// Type-erased response generator, selected at runtime.
pub struct BoxResponseGenerator {
    inner: Box<dyn ResponseGeneratorDyn + Send + Sync>,
}

impl BoxResponseGenerator {
    pub fn new<T: ResponseGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate(
        &self,
        context: &[ContextMessage],
        persona: &PersonaConfig,
        user_text: &str,
    ) -> Result<String, GenerationError> {
        self.inner.generate_boxed(context, persona, user_text).await
    }
}

// --- Synthesizer ---

/// Object-safe version of [`Synthesizer`].
pub trait SynthesizerDyn: Send + Sync {
    fn name(&self) -> &str;
    fn synthesize_boxed<'a>(&'a self, text: &'a str)
    -> BoxFuture<'a, Result<AudioBlob, SynthesisError>>;
}

impl<T: Synthesizer> SynthesizerDyn for T {
    fn name(&self) -> &str {
        Synthesizer::name(self)
    }

    fn synthesize_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<AudioBlob, SynthesisError>> {
        Box::pin(self.synthesize(text))
    }
}

/// Type-erased speech synthesizer.
pub struct BoxSynthesizer {
    inner: Box<dyn SynthesizerDyn + Send + Sync>,
}

impl BoxSynthesizer {
    pub fn new<T: Synthesizer + 'static>(synthesizer: T) -> Self {
        Self {
            inner: Box::new(synthesizer),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn synthesize(&self, text: &str) -> Result<AudioBlob, SynthesisError> {
        self.inner.synthesize_boxed(text).await
    }
}

// --- Player ---

/// Object-safe version of [`Player`].
pub trait PlayerDyn: Send + Sync {
    fn name(&self) -> &str;
    fn play_boxed<'a>(&'a self, audio: &'a AudioBlob) -> BoxFuture<'a, Result<(), PlaybackError>>;
    fn release_boxed(&self) -> BoxFuture<'_, ()>;
}

impl<T: Player> PlayerDyn for T {
    fn name(&self) -> &str {
        Player::name(self)
    }

    fn play_boxed<'a>(&'a self, audio: &'a AudioBlob) -> BoxFuture<'a, Result<(), PlaybackError>> {
        Box::pin(self.play(audio))
    }

    fn release_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(Player::release(self))
    }
}

/// Type-erased audio output.
pub struct BoxPlayer {
    inner: Box<dyn PlayerDyn + Send + Sync>,
}

impl BoxPlayer {
    pub fn new<T: Player + 'static>(player: T) -> Self {
        Self {
            inner: Box::new(player),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn play(&self, audio: &AudioBlob) -> Result<(), PlaybackError> {
        self.inner.play_boxed(audio).await
    }

    pub async fn release(&self) {
        self.inner.release_boxed().await
    }
}
