//! Scripted gateway doubles shared by the pipeline and session tests.
//!
//! Every mock is `Clone` and shares its state through `Arc`s, so a test can
//! keep one handle for inspection after boxing another into [`Gateways`].
//! Unscripted calls fall back to a canned success.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use colloquy_types::audio::{AudioBlob, AudioFormat};
use colloquy_types::context::ContextMessage;
use colloquy_types::error::{
    CaptureError, GenerationError, PlaybackError, SynthesisError, TranscriptionError,
};
use colloquy_types::persona::PersonaConfig;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::gateway::{Gateways, Player, ResponseGenerator, SpeechCapture, Synthesizer, Transcriber};

/// Queue of scripted results, consumed one per call.
pub struct Script<T, E> {
    queue: Arc<Mutex<VecDeque<Result<T, E>>>>,
    calls: Arc<AtomicUsize>,
}

impl<T, E> Script<T, E> {
    pub fn push(&self, result: Result<T, E>) {
        self.queue.lock().unwrap().push_back(result);
    }

    fn next(&self) -> Option<Result<T, E>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().pop_front()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T, E> Default for Script<T, E> {
    fn default() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<T, E> Clone for Script<T, E> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            calls: Arc::clone(&self.calls),
        }
    }
}

/// Parks a gateway call until the test releases it.
#[derive(Clone, Default)]
pub struct Hold {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Hold {
    async fn park(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

async fn stall(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

pub fn sample_audio() -> AudioBlob {
    AudioBlob::new(AudioFormat::Wav, vec![0x52u8, 0x49, 0x46, 0x46])
}

#[derive(Clone, Default)]
pub struct MockCapture {
    pub script: Script<AudioBlob, CaptureError>,
    pub durations: Arc<Mutex<Vec<Duration>>>,
    pub released: Arc<AtomicBool>,
    pub delay: Option<Duration>,
}

impl SpeechCapture for MockCapture {
    fn name(&self) -> &str {
        "mock-capture"
    }

    fn capture(
        &self,
        duration: Duration,
    ) -> impl Future<Output = Result<AudioBlob, CaptureError>> + Send {
        self.durations.lock().unwrap().push(duration);
        let result = self.script.next().unwrap_or_else(|| Ok(sample_audio()));
        let delay = self.delay;
        async move {
            stall(delay).await;
            result
        }
    }

    fn release(&self) -> impl Future<Output = ()> + Send {
        self.released.store(true, Ordering::SeqCst);
        async {}
    }
}

#[derive(Clone, Default)]
pub struct MockTranscriber {
    pub script: Script<String, TranscriptionError>,
    pub seen: Arc<Mutex<Vec<Uuid>>>,
    pub delay: Option<Duration>,
}

impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock-transcriber"
    }

    fn transcribe(
        &self,
        audio: &AudioBlob,
    ) -> impl Future<Output = Result<String, TranscriptionError>> + Send {
        self.seen.lock().unwrap().push(audio.id());
        let result = self.script.next().unwrap_or_else(|| Ok("Hi".to_string()));
        let delay = self.delay;
        async move {
            stall(delay).await;
            result
        }
    }
}

/// Arguments of one `generate` call.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub persona: String,
    pub system_prompt: String,
    pub context: Vec<ContextMessage>,
    pub user_text: String,
}

#[derive(Clone, Default)]
pub struct MockGenerator {
    pub script: Script<String, GenerationError>,
    pub calls: Arc<Mutex<Vec<GenerationCall>>>,
    pub delay: Option<Duration>,
    pub hold: Option<Hold>,
}

impl MockGenerator {
    pub fn recorded(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ResponseGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn generate(
        &self,
        context: &[ContextMessage],
        persona: &PersonaConfig,
        user_text: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        self.calls.lock().unwrap().push(GenerationCall {
            persona: persona.name.clone(),
            system_prompt: persona.system_prompt.clone(),
            context: context.to_vec(),
            user_text: user_text.to_string(),
        });
        let result = self
            .script
            .next()
            .unwrap_or_else(|| Ok(format!("reply to {user_text}")));
        let delay = self.delay;
        let hold = self.hold.clone();
        async move {
            if let Some(hold) = hold {
                hold.park().await;
            }
            stall(delay).await;
            result
        }
    }
}

#[derive(Clone, Default)]
pub struct MockSynthesizer {
    pub script: Script<AudioBlob, SynthesisError>,
    pub delay: Option<Duration>,
}

impl Synthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock-synthesizer"
    }

    fn synthesize(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<AudioBlob, SynthesisError>> + Send {
        let result = self
            .script
            .next()
            .unwrap_or_else(|| Ok(AudioBlob::new(AudioFormat::Mp3, text.as_bytes().to_vec())));
        let delay = self.delay;
        async move {
            stall(delay).await;
            result
        }
    }
}

#[derive(Clone, Default)]
pub struct MockPlayer {
    pub script: Script<(), PlaybackError>,
    pub played: Arc<Mutex<Vec<Uuid>>>,
    pub hold: Option<Hold>,
    pub released: Arc<AtomicBool>,
    pub delay: Option<Duration>,
}

impl MockPlayer {
    pub fn played_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

impl Player for MockPlayer {
    fn name(&self) -> &str {
        "mock-player"
    }

    fn play(&self, audio: &AudioBlob) -> impl Future<Output = Result<(), PlaybackError>> + Send {
        self.played.lock().unwrap().push(audio.id());
        let result = self.script.next().unwrap_or(Ok(()));
        let hold = self.hold.clone();
        let delay = self.delay;
        async move {
            if let Some(hold) = hold {
                hold.park().await;
            }
            stall(delay).await;
            result
        }
    }

    fn release(&self) -> impl Future<Output = ()> + Send {
        self.released.store(true, Ordering::SeqCst);
        async {}
    }
}

/// One of each mock, boxed into [`Gateways`] on demand.
#[derive(Clone, Default)]
pub struct MockGateways {
    pub capture: MockCapture,
    pub transcriber: MockTranscriber,
    pub generator: MockGenerator,
    pub synthesizer: MockSynthesizer,
    pub player: MockPlayer,
}

impl MockGateways {
    pub fn gateways(&self) -> Gateways {
        Gateways::new(
            self.capture.clone(),
            self.transcriber.clone(),
            self.generator.clone(),
            self.synthesizer.clone(),
            self.player.clone(),
        )
    }
}
