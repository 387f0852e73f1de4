use std::time::Duration;

use thiserror::Error;

use crate::turn::{TurnId, TurnStage};

/// Errors from the speech capture gateway.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("recording interrupted")]
    Interrupted,

    #[error("capture device error: {0}")]
    Device(String),

    #[error("capture timed out after {0:?}")]
    Timeout(Duration),
}

impl CaptureError {
    /// Whether a retry of the same capture may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, CaptureError::DeviceUnavailable(_))
    }
}

/// Errors from the transcription gateway.
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    /// The transcriber produced nothing usable (empty text or a sentinel).
    #[error("no clear speech detected")]
    Unintelligible,

    #[error("audio not found: {0}")]
    AudioNotFound(String),

    #[error("transcription service error: {0}")]
    Service(String),

    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the response generation gateway.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generation backend error: {0}")]
    Backend(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the speech synthesis gateway.
#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("synthesis service error: {0}")]
    Service(String),

    #[error("synthesis returned no audio")]
    EmptyAudio,

    #[error("synthesis timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the playback gateway. Never fatal to a turn.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("playback device error: {0}")]
    Device(String),

    #[error("playback io error: {0}")]
    Io(String),

    #[error("playback timed out after {0:?}")]
    Timeout(Duration),
}

/// A persona name that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persona '{name}' not found")]
pub struct PersonaNotFoundError {
    pub name: String,
}

/// Violations of the memory commit invariants.
///
/// These indicate a programming error in the caller, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("turn {0} is incomplete and cannot be committed")]
    IncompleteTurn(TurnId),

    #[error("turn {turn_id} is out of order (last committed: {last})")]
    OutOfOrder { turn_id: TurnId, last: TurnId },
}

/// Failure of a single turn attempt.
///
/// Every variant means "this attempt produced nothing for history"; the
/// caller decides whether to retry the turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("turn cancelled during {stage}")]
    Cancelled { stage: TurnStage },

    #[error("a turn is already in progress")]
    TurnInProgress,

    #[error("session is closed")]
    SessionClosed,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("memory invariant violated: {0}")]
    Memory(#[from] MemoryError),

    #[error("illegal stage transition from {from} to {to}")]
    IllegalTransition { from: TurnStage, to: TurnStage },
}

impl TurnError {
    /// Whether retrying the whole turn is a sensible reaction.
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::Capture(e) => e.is_transient(),
            TurnError::Transcription(_) | TurnError::Cancelled { .. } | TurnError::TurnInProgress => {
                true
            }
            TurnError::SessionClosed
            | TurnError::InvalidInput(_)
            | TurnError::Memory(_)
            | TurnError::IllegalTransition { .. } => false,
        }
    }

    /// The pipeline stage the failure occurred in, if any.
    pub fn stage(&self) -> Option<TurnStage> {
        match self {
            TurnError::Capture(_) => Some(TurnStage::Capturing),
            TurnError::Transcription(_) => Some(TurnStage::Transcribing),
            TurnError::Cancelled { stage } => Some(*stage),
            _ => None,
        }
    }
}

/// Errors from session management operations (persona switch, clear).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    PersonaNotFound(#[from] PersonaNotFoundError),

    #[error("a turn is already in progress")]
    TurnInProgress,

    #[error("session is closed")]
    SessionClosed,

    #[error("invalid session configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Errors from validating a session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("retention window must keep at least one turn")]
    EmptyRetentionWindow,

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("capture duration must be greater than zero")]
    ZeroCaptureDuration,

    #[error("'{name}' of {secs}s exceeds the {max}s limit")]
    TooLong {
        name: &'static str,
        secs: u64,
        max: u64,
    },

    #[error("default persona must not be empty")]
    EmptyDefaultPersona,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_not_found_display() {
        let err = PersonaNotFoundError {
            name: "nonexistent-persona".to_string(),
        };
        assert_eq!(err.to_string(), "persona 'nonexistent-persona' not found");
    }

    #[test]
    fn test_capture_error_transience() {
        assert!(CaptureError::Interrupted.is_transient());
        assert!(CaptureError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!CaptureError::DeviceUnavailable("no mic".to_string()).is_transient());
    }

    #[test]
    fn test_turn_error_retryable() {
        assert!(TurnError::from(TranscriptionError::Unintelligible).is_retryable());
        assert!(TurnError::TurnInProgress.is_retryable());
        assert!(!TurnError::SessionClosed.is_retryable());
        assert!(!TurnError::from(CaptureError::DeviceUnavailable("x".into())).is_retryable());
    }

    #[test]
    fn test_turn_error_stage() {
        let err = TurnError::Cancelled {
            stage: TurnStage::Generating,
        };
        assert_eq!(err.stage(), Some(TurnStage::Generating));
        assert_eq!(err.to_string(), "turn cancelled during generating");
        assert_eq!(TurnError::TurnInProgress.stage(), None);
    }

    #[test]
    fn test_memory_error_display() {
        let err = MemoryError::OutOfOrder {
            turn_id: TurnId(2),
            last: TurnId(5),
        };
        assert_eq!(err.to_string(), "turn 2 is out of order (last committed: 5)");
    }

    #[test]
    fn test_session_error_wraps_persona_not_found() {
        let err: SessionError = PersonaNotFoundError {
            name: "ghost".to_string(),
        }
        .into();
        assert!(matches!(err, SessionError::PersonaNotFound(_)));
        assert!(err.to_string().contains("ghost"));
    }
}
