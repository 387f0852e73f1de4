//! Event types for the Colloquy session event bus.
//!
//! `TurnEvent` is broadcast while sessions run turns. Non-fatal failures
//! (synthesis, playback) are only observable through these events and the
//! tracing output. All variants are Clone + Send + Sync for use with tokio
//! broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::turn::{TurnId, TurnStage};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The pipeline moved into a new stage.
    StageEntered {
        session_id: Uuid,
        /// Absent while capturing (no turn exists yet).
        turn_id: Option<TurnId>,
        stage: TurnStage,
    },

    /// A stage failed but the turn continued with degraded content.
    StageDegraded {
        session_id: Uuid,
        turn_id: TurnId,
        stage: TurnStage,
        reason: String,
    },

    /// A turn was committed to session memory.
    TurnCommitted {
        session_id: Uuid,
        turn_id: TurnId,
        persona: String,
        degraded: bool,
    },

    /// A turn attempt ended without a commit.
    TurnDiscarded {
        session_id: Uuid,
        turn_id: Option<TurnId>,
        stage: TurnStage,
        reason: String,
    },

    PersonaSwitched {
        session_id: Uuid,
        from: String,
        to: String,
        memory_preserved: bool,
    },

    MemoryCleared {
        session_id: Uuid,
        discarded_turns: usize,
    },

    SessionClosed { session_id: Uuid },
}

impl TurnEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            TurnEvent::StageEntered { session_id, .. }
            | TurnEvent::StageDegraded { session_id, .. }
            | TurnEvent::TurnCommitted { session_id, .. }
            | TurnEvent::TurnDiscarded { session_id, .. }
            | TurnEvent::PersonaSwitched { session_id, .. }
            | TurnEvent::MemoryCleared { session_id, .. }
            | TurnEvent::SessionClosed { session_id } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_event_serde_tag() {
        let event = TurnEvent::StageDegraded {
            session_id: Uuid::now_v7(),
            turn_id: TurnId(4),
            stage: TurnStage::Synthesizing,
            reason: "tts down".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"stage_degraded\""));
        assert!(json.contains("\"stage\":\"synthesizing\""));
        assert!(json.contains("\"turn_id\":4"));
    }

    #[test]
    fn test_session_id_accessor() {
        let id = Uuid::now_v7();
        let event = TurnEvent::SessionClosed { session_id: id };
        assert_eq!(event.session_id(), id);
    }
}
