//! ConversationSession: one user's conversation with the assistant.
//!
//! A session owns its memory, its active persona binding and its gateways.
//! At most one turn runs at a time; a second turn, a persona switch or a
//! clear requested while a turn is in flight is rejected rather than queued.
//! All methods take `&self`, so a session can be shared behind an `Arc`
//! between the task running turns and the one issuing cancellations.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use colloquy_types::audio::AudioBlob;
use colloquy_types::config::SessionConfig;
use colloquy_types::context::ContextMessage;
use colloquy_types::error::{SessionError, TurnError};
use colloquy_types::event::TurnEvent;
use colloquy_types::persona::PersonaConfig;
use colloquy_types::turn::{Turn, TurnResult};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::event::EventBus;
use crate::gateway::Gateways;
use crate::memory::MemoryStore;
use crate::persona::PersonaRegistry;
use crate::pipeline::{PipelineDeps, TurnIdSequence, TurnInput, TurnPipeline};

/// Clears the in-flight token when a turn ends, including when the caller
/// drops the turn future before it completes.
struct InFlight<'a>(&'a ConversationSession);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.state().in_flight = None;
    }
}

/// Mutable session state. Locked only briefly, never across an await.
struct SessionState {
    persona: Arc<PersonaConfig>,
    memory: MemoryStore,
    in_flight: Option<CancellationToken>,
    closed: bool,
}

pub struct ConversationSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    config: SessionConfig,
    registry: Arc<PersonaRegistry>,
    gateways: Gateways,
    events: EventBus,
    turn_ids: TurnIdSequence,
    /// Held for the whole duration of a turn, persona switch or clear.
    turn_gate: tokio::sync::Mutex<()>,
    state: Mutex<SessionState>,
    /// Parent of every turn's cancellation token; cancelled on close.
    shutdown: CancellationToken,
}

impl ConversationSession {
    /// Create a session bound to the configured default persona.
    pub fn new(
        config: SessionConfig,
        registry: Arc<PersonaRegistry>,
        gateways: Gateways,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let persona = registry.resolve(&config.default_persona)?;
        let id = Uuid::now_v7();

        info!(
            session_id = %id,
            persona = %persona.name,
            retention = ?config.retention,
            "Session created"
        );

        Ok(Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(SessionState {
                persona,
                memory: MemoryStore::new(config.retention),
                in_flight: None,
                closed: false,
            }),
            config,
            registry,
            gateways,
            events: EventBus::default(),
            turn_ids: TurnIdSequence::new(),
            turn_gate: tokio::sync::Mutex::new(()),
            shutdown: CancellationToken::new(),
        })
    }

    /// Publish lifecycle events on `events` instead of a private bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Capture speech and run a full voice turn.
    ///
    /// `capture_duration` defaults to the session's configured duration.
    pub async fn run_turn(&self, capture_duration: Option<Duration>) -> Result<TurnResult, TurnError> {
        let duration = capture_duration.unwrap_or_else(|| self.config.capture_duration());
        self.execute(TurnInput::Capture { duration }).await
    }

    /// Run a turn from typed text, skipping capture and transcription.
    pub async fn process_text(&self, user_text: &str) -> Result<TurnResult, TurnError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(TurnError::InvalidInput("user text is empty".to_string()));
        }
        self.execute(TurnInput::Text(text.to_string())).await
    }

    /// Run a turn from caller-supplied audio, skipping capture.
    pub async fn process_prerecorded_audio(&self, audio: AudioBlob) -> Result<TurnResult, TurnError> {
        if audio.is_empty() {
            return Err(TurnError::InvalidInput("audio is empty".to_string()));
        }
        self.execute(TurnInput::Audio(audio)).await
    }

    async fn execute(&self, input: TurnInput) -> Result<TurnResult, TurnError> {
        let _gate = self
            .turn_gate
            .try_lock()
            .map_err(|_| TurnError::TurnInProgress)?;

        let (persona, context, cancel) = {
            let mut state = self.state();
            if state.closed {
                return Err(TurnError::SessionClosed);
            }
            let cancel = self.shutdown.child_token();
            state.in_flight = Some(cancel.clone());
            (
                Arc::clone(&state.persona),
                state.memory.snapshot_as_context(),
                cancel,
            )
        };
        let _in_flight = InFlight(self);

        let span = info_span!(
            "turn",
            session_id = %self.id,
            persona = %persona.name,
            input = input.kind(),
        );
        let deps = PipelineDeps {
            session_id: self.id,
            gateways: &self.gateways,
            config: &self.config,
            turn_ids: &self.turn_ids,
            events: &self.events,
        };
        TurnPipeline::new(deps, persona, context, cancel.clone())
            .run(input, |turn| self.commit(turn, &cancel))
            .instrument(span)
            .await
    }

    /// Append under the state lock. `close` flips `closed` before it cancels
    /// the shutdown token, so both are checked.
    fn commit(&self, turn: Turn, cancel: &CancellationToken) -> Result<(), TurnError> {
        let mut state = self.state();
        if state.closed {
            return Err(TurnError::SessionClosed);
        }
        if cancel.is_cancelled() {
            return Err(TurnError::Cancelled {
                stage: turn.stage_reached,
            });
        }
        state.memory.append(turn)?;
        Ok(())
    }

    /// Bind the session to another registered persona.
    ///
    /// With `preserve_memory` the history is kept and later turns see it as
    /// context; otherwise memory is replaced with an empty store. Turn ids
    /// keep counting either way. An unknown name leaves the session as it was.
    pub fn switch_persona(&self, name: &str, preserve_memory: bool) -> Result<(), SessionError> {
        let _gate = self
            .turn_gate
            .try_lock()
            .map_err(|_| SessionError::TurnInProgress)?;

        let mut state = self.state();
        if state.closed {
            return Err(SessionError::SessionClosed);
        }
        let persona = self.registry.resolve(name)?;
        let previous = mem::replace(&mut state.persona, persona);
        if !preserve_memory {
            state.memory = MemoryStore::new(self.config.retention);
        }
        drop(state);

        info!(
            session_id = %self.id,
            from = %previous.name,
            to = %name,
            memory_preserved = preserve_memory,
            "Persona switched"
        );
        self.events.publish(TurnEvent::PersonaSwitched {
            session_id: self.id,
            from: previous.name.clone(),
            to: name.to_string(),
            memory_preserved: preserve_memory,
        });
        Ok(())
    }

    /// Drop all committed turns. Idempotent.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _gate = self
            .turn_gate
            .try_lock()
            .map_err(|_| SessionError::TurnInProgress)?;

        let discarded = {
            let mut state = self.state();
            if state.closed {
                return Err(SessionError::SessionClosed);
            }
            state.memory.clear()
        };

        info!(session_id = %self.id, discarded, "Memory cleared");
        self.events.publish(TurnEvent::MemoryCleared {
            session_id: self.id,
            discarded_turns: discarded,
        });
        Ok(())
    }

    /// Committed turns in commit order.
    pub fn history(&self) -> Vec<Turn> {
        self.state().memory.turns().to_vec()
    }

    /// The context the next turn's generator call would receive.
    pub fn context_snapshot(&self) -> Vec<ContextMessage> {
        self.state().memory.snapshot_as_context()
    }

    pub fn active_persona(&self) -> Arc<PersonaConfig> {
        Arc::clone(&self.state().persona)
    }

    pub fn turn_in_progress(&self) -> bool {
        self.turn_gate.try_lock().is_err()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Cancel the in-flight turn, if any. Returns whether one was running.
    ///
    /// The turn ends with [`TurnError::Cancelled`] at its next stage boundary
    /// or gateway await, and nothing is committed.
    pub fn cancel_turn(&self) -> bool {
        match self.state().in_flight.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Close the session: cancel any in-flight turn, refuse new ones and
    /// release the capture and playback devices. Idempotent.
    ///
    /// History stays readable after close.
    pub async fn close(&self) {
        {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        self.shutdown.cancel();

        self.gateways.capture.release().await;
        self.gateways.player.release().await;

        info!(session_id = %self.id, turns = self.state().memory.len(), "Session closed");
        self.events.publish(TurnEvent::SessionClosed {
            session_id: self.id,
        });
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("gateways", &self.gateways)
            .finish_non_exhaustive()
    }
}
