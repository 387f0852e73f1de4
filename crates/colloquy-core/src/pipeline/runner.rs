//! TurnPipeline: drives one turn through capture, transcription,
//! generation, synthesis and playback.
//!
//! Each gateway call runs under the stage's timeout and the turn's
//! cancellation token. Failures are handled per stage:
//!
//! - capture: transient errors are retried up to the configured count, then
//!   the attempt is discarded
//! - transcription: empty or sentinel output is unintelligible; the attempt
//!   is discarded
//! - generation: any failure is replaced by [`GENERATION_FALLBACK`] and the
//!   turn continues
//! - synthesis: failure leaves the turn without audio and skips playback
//! - playback: failure is logged and published, nothing else
//!
//! A turn is committed (through the caller-supplied commit function) only
//! after all stages have finished and no cancellation was observed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use colloquy_types::audio::AudioBlob;
use colloquy_types::config::SessionConfig;
use colloquy_types::context::ContextMessage;
use colloquy_types::error::{
    CaptureError, GenerationError, PlaybackError, SynthesisError, TranscriptionError, TurnError,
};
use colloquy_types::event::TurnEvent;
use colloquy_types::persona::PersonaConfig;
use colloquy_types::turn::{Degradation, Turn, TurnId, TurnResult, TurnStage};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::TurnIdSequence;
use super::state::{FailureKind, TurnStateMachine};
use crate::event::EventBus;
use crate::gateway::Gateways;

/// Reply used when the generator fails or times out.
pub const GENERATION_FALLBACK: &str =
    "I apologize, but I encountered an error trying to generate a response.";

/// Transcriber outputs that mean "nothing usable was heard".
const UNINTELLIGIBLE_SENTINELS: [&str; 2] = ["Audio file not found.", "Could not transcribe audio."];

/// Where a turn starts from.
#[derive(Debug, Clone)]
pub enum TurnInput {
    /// Record from the capture device.
    Capture { duration: Duration },
    /// Transcribe audio supplied by the caller.
    Audio(AudioBlob),
    /// Use the text as the user's utterance directly.
    Text(String),
}

impl TurnInput {
    pub fn kind(&self) -> &'static str {
        match self {
            TurnInput::Capture { .. } => "capture",
            TurnInput::Audio(_) => "audio",
            TurnInput::Text(_) => "text",
        }
    }
}

/// Trim raw transcriber output, rejecting empty text and sentinel phrases.
pub fn normalize_transcript(raw: &str) -> Result<String, TranscriptionError> {
    let text = raw.trim();
    if text.is_empty()
        || UNINTELLIGIBLE_SENTINELS
            .iter()
            .any(|sentinel| text.eq_ignore_ascii_case(sentinel))
    {
        return Err(TranscriptionError::Unintelligible);
    }
    Ok(text.to_string())
}

/// Session-owned collaborators a pipeline run borrows.
#[derive(Clone, Copy)]
pub struct PipelineDeps<'a> {
    pub session_id: Uuid,
    pub gateways: &'a Gateways,
    pub config: &'a SessionConfig,
    pub turn_ids: &'a TurnIdSequence,
    pub events: &'a EventBus,
}

/// Why a guarded gateway call did not produce a result.
enum Interrupt {
    Cancelled,
    TimedOut(Duration),
}

/// A single turn attempt. Consumed by [`TurnPipeline::run`].
pub struct TurnPipeline<'a> {
    deps: PipelineDeps<'a>,
    persona: Arc<PersonaConfig>,
    context: Vec<ContextMessage>,
    cancel: CancellationToken,
    machine: TurnStateMachine,
    degradations: Vec<Degradation>,
}

impl<'a> TurnPipeline<'a> {
    /// Prepare a run bound to `persona` with the given prior `context`.
    ///
    /// Both are snapshots: a persona switch or memory clear after this point
    /// does not affect the run.
    pub fn new(
        deps: PipelineDeps<'a>,
        persona: Arc<PersonaConfig>,
        context: Vec<ContextMessage>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            deps,
            persona,
            context,
            cancel,
            machine: TurnStateMachine::new(),
            degradations: Vec::new(),
        }
    }

    /// Run the turn to completion and hand the finished [`Turn`] to `commit`.
    ///
    /// `commit` is called at most once, only for a complete turn. If it
    /// fails, the attempt is discarded and its error returned.
    pub async fn run<C>(mut self, input: TurnInput, commit: C) -> Result<TurnResult, TurnError>
    where
        C: FnOnce(Turn) -> Result<(), TurnError> + Send,
    {
        let (mut turn, user_text) = match input {
            TurnInput::Text(text) => (self.begin_turn(TurnStage::Generating)?, text),
            TurnInput::Audio(audio) => self.begin_from_audio(audio).await?,
            TurnInput::Capture { duration } => {
                let audio = self.capture(duration).await?;
                self.begin_from_audio(audio).await?
            }
        };
        turn.user_text = Some(user_text.clone());

        let ai_text = self.generate(turn.id, &user_text).await?;
        turn.ai_text = Some(ai_text.clone());

        self.advance(&mut turn, TurnStage::Synthesizing)?;
        let audio = self.synthesize(turn.id, &ai_text).await?;
        turn.audio = audio.as_ref().map(AudioBlob::to_ref);

        if let Some(audio) = &audio {
            self.advance(&mut turn, TurnStage::Playing)?;
            self.play(turn.id, audio).await?;
        }

        if self.cancel.is_cancelled() {
            return Err(self.cancelled(Some(turn.id)));
        }
        self.advance(&mut turn, TurnStage::Complete)?;

        let turn_id = turn.id;
        let persona = turn.persona.clone();
        if let Err(err) = commit(turn) {
            return Err(self.discard(Some(turn_id), err));
        }

        let degraded = !self.degradations.is_empty();
        info!(%turn_id, %persona, degraded, "Turn committed");
        self.deps.events.publish(TurnEvent::TurnCommitted {
            session_id: self.deps.session_id,
            turn_id,
            persona: persona.clone(),
            degraded,
        });

        Ok(TurnResult {
            turn_id,
            user_text,
            ai_text,
            audio,
            persona,
            degradations: self.degradations,
        })
    }

    /// Allocate the turn id and enter the first stage that has input.
    fn begin_turn(&mut self, stage: TurnStage) -> Result<Turn, TurnError> {
        let id = self.deps.turn_ids.next_id();
        let mut turn = Turn::begin(id, self.persona.name.clone(), stage);
        self.advance(&mut turn, stage)?;
        Ok(turn)
    }

    async fn begin_from_audio(&mut self, audio: AudioBlob) -> Result<(Turn, String), TurnError> {
        let mut turn = self.begin_turn(TurnStage::Transcribing)?;
        let text = self.transcribe(turn.id, &audio).await?;
        self.advance(&mut turn, TurnStage::Generating)?;
        Ok((turn, text))
    }

    async fn capture(&mut self, duration: Duration) -> Result<AudioBlob, TurnError> {
        self.enter(None, TurnStage::Capturing)?;

        let limit = self.deps.config.timeouts.capture(duration);
        let max_attempts = self.deps.config.capture_retries + 1;
        let mut attempt = 1;
        loop {
            let span = info_span!(
                "gateway.capture",
                gateway = self.deps.gateways.capture.name(),
                attempt,
                duration_ms = duration.as_millis() as u64,
            );
            let outcome = self
                .guarded(limit, self.deps.gateways.capture.capture(duration))
                .instrument(span)
                .await;
            let error = match outcome {
                Ok(Ok(audio)) if !audio.is_empty() => return Ok(audio),
                Ok(Ok(_)) => CaptureError::Device("captured audio is empty".to_string()),
                Ok(Err(err)) => err,
                Err(Interrupt::TimedOut(after)) => CaptureError::Timeout(after),
                Err(Interrupt::Cancelled) => return Err(self.cancelled(None)),
            };

            if error.is_transient() && attempt < max_attempts {
                warn!(attempt, max_attempts, error = %error, "Capture failed, retrying");
                attempt += 1;
                continue;
            }
            return Err(self.discard(None, error.into()));
        }
    }

    async fn transcribe(&mut self, turn_id: TurnId, audio: &AudioBlob) -> Result<String, TurnError> {
        let span = info_span!(
            "gateway.transcribe",
            gateway = self.deps.gateways.transcriber.name(),
            %turn_id,
            format = %audio.format(),
            bytes = audio.len(),
        );
        let outcome = self
            .guarded(
                self.deps.config.timeouts.transcribe(),
                self.deps.gateways.transcriber.transcribe(audio),
            )
            .instrument(span)
            .await;
        let error = match outcome {
            Ok(Ok(raw)) => match normalize_transcript(&raw) {
                Ok(text) => {
                    debug!(%turn_id, chars = text.len(), "Transcribed user speech");
                    return Ok(text);
                }
                Err(err) => err,
            },
            Ok(Err(err)) => err,
            Err(Interrupt::TimedOut(after)) => TranscriptionError::Timeout(after),
            Err(Interrupt::Cancelled) => return Err(self.cancelled(Some(turn_id))),
        };
        Err(self.discard(Some(turn_id), error.into()))
    }

    async fn generate(&mut self, turn_id: TurnId, user_text: &str) -> Result<String, TurnError> {
        let span = info_span!(
            "gen_ai.generate",
            gen_ai.system = self.deps.gateways.generator.name(),
            gen_ai.request.model = %self.persona.model.model_id,
            gen_ai.request.max_tokens = self.persona.model.max_tokens,
            gen_ai.request.temperature = self.persona.model.temperature,
            persona = %self.persona.name,
            %turn_id,
            context_messages = self.context.len(),
        );
        let outcome = self
            .guarded(
                self.deps.config.timeouts.generate(),
                self.deps
                    .gateways
                    .generator
                    .generate(&self.context, &self.persona, user_text),
            )
            .instrument(span)
            .await;
        let error = match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => return Ok(text),
            Ok(Ok(_)) => GenerationError::EmptyResponse,
            Ok(Err(err)) => err,
            Err(Interrupt::TimedOut(after)) => GenerationError::Timeout(after),
            Err(Interrupt::Cancelled) => return Err(self.cancelled(Some(turn_id))),
        };
        self.degrade(turn_id, TurnStage::Generating, error.to_string());
        Ok(GENERATION_FALLBACK.to_string())
    }

    async fn synthesize(
        &mut self,
        turn_id: TurnId,
        text: &str,
    ) -> Result<Option<AudioBlob>, TurnError> {
        let span = info_span!(
            "gateway.synthesize",
            gateway = self.deps.gateways.synthesizer.name(),
            %turn_id,
            chars = text.len(),
        );
        let outcome = self
            .guarded(
                self.deps.config.timeouts.synthesize(),
                self.deps.gateways.synthesizer.synthesize(text),
            )
            .instrument(span)
            .await;
        let error = match outcome {
            Ok(Ok(audio)) if !audio.is_empty() => return Ok(Some(audio)),
            Ok(Ok(_)) => SynthesisError::EmptyAudio,
            Ok(Err(err)) => err,
            Err(Interrupt::TimedOut(after)) => SynthesisError::Timeout(after),
            Err(Interrupt::Cancelled) => return Err(self.cancelled(Some(turn_id))),
        };
        self.degrade(turn_id, TurnStage::Synthesizing, error.to_string());
        Ok(None)
    }

    async fn play(&mut self, turn_id: TurnId, audio: &AudioBlob) -> Result<(), TurnError> {
        let span = info_span!(
            "gateway.play",
            gateway = self.deps.gateways.player.name(),
            %turn_id,
            bytes = audio.len(),
        );
        let outcome = self
            .guarded(
                self.deps.config.timeouts.play(),
                self.deps.gateways.player.play(audio),
            )
            .instrument(span)
            .await;
        let error = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err,
            Err(Interrupt::TimedOut(after)) => PlaybackError::Timeout(after),
            Err(Interrupt::Cancelled) => return Err(self.cancelled(Some(turn_id))),
        };
        // Playback never changes what the turn recorded.
        warn!(%turn_id, error = %error, "Playback failed");
        self.deps.events.publish(TurnEvent::StageDegraded {
            session_id: self.deps.session_id,
            turn_id,
            stage: TurnStage::Playing,
            reason: error.to_string(),
        });
        Ok(())
    }

    /// Await a gateway call under a timeout, giving up early on cancellation.
    async fn guarded<T, E>(
        &self,
        limit: Duration,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<Result<T, E>, Interrupt> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            outcome = tokio::time::timeout(limit, call) => {
                outcome.map_err(|_| Interrupt::TimedOut(limit))
            }
        }
    }

    fn enter(&mut self, turn_id: Option<TurnId>, stage: TurnStage) -> Result<(), TurnError> {
        if let Err(err) = self.machine.enter(stage) {
            return Err(self.discard(turn_id, err));
        }
        debug!(turn_id = ?turn_id.map(|id| id.0), %stage, "Entered stage");
        self.deps.events.publish(TurnEvent::StageEntered {
            session_id: self.deps.session_id,
            turn_id,
            stage,
        });
        Ok(())
    }

    fn advance(&mut self, turn: &mut Turn, stage: TurnStage) -> Result<(), TurnError> {
        self.enter(Some(turn.id), stage)?;
        turn.stage_reached = stage;
        Ok(())
    }

    fn degrade(&mut self, turn_id: TurnId, stage: TurnStage, reason: String) {
        warn!(%turn_id, %stage, reason = %reason, "Stage degraded, continuing turn");
        self.deps.events.publish(TurnEvent::StageDegraded {
            session_id: self.deps.session_id,
            turn_id,
            stage,
            reason: reason.clone(),
        });
        self.degradations.push(Degradation { stage, reason });
    }

    fn cancelled(&mut self, turn_id: Option<TurnId>) -> TurnError {
        let stage = self.machine.stage();
        self.discard(turn_id, TurnError::Cancelled { stage })
    }

    /// Fail the state machine and report the attempt as discarded.
    fn discard(&mut self, turn_id: Option<TurnId>, err: TurnError) -> TurnError {
        let stage = self.machine.fail(FailureKind::from(&err));
        let id = turn_id.map(|id| id.0);
        match &err {
            TurnError::Cancelled { .. } => info!(turn_id = ?id, %stage, "Turn cancelled"),
            _ => warn!(turn_id = ?id, %stage, error = %err, "Turn discarded"),
        }
        self.deps.events.publish(TurnEvent::TurnDiscarded {
            session_id: self.deps.session_id,
            turn_id,
            stage,
            reason: err.to_string(),
        });
        err
    }
}
