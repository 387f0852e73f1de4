//! Turn types: one request/response exchange of a conversation.
//!
//! A [`Turn`] is the record kept in session memory. A [`TurnResult`] is what
//! the caller receives after a turn completes, including the synthesized
//! audio and any non-fatal degradations that were absorbed on the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::audio::{AudioBlob, AudioRef};

/// Session-scoped turn identifier. Strictly increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stages of the turn pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    Idle,
    Capturing,
    Transcribing,
    Generating,
    Synthesizing,
    Playing,
    Complete,
}

impl TurnStage {
    /// The stage that follows this one on success, if any.
    pub fn next(&self) -> Option<TurnStage> {
        match self {
            TurnStage::Idle => Some(TurnStage::Capturing),
            TurnStage::Capturing => Some(TurnStage::Transcribing),
            TurnStage::Transcribing => Some(TurnStage::Generating),
            TurnStage::Generating => Some(TurnStage::Synthesizing),
            TurnStage::Synthesizing => Some(TurnStage::Playing),
            TurnStage::Playing => Some(TurnStage::Complete),
            TurnStage::Complete => None,
        }
    }
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnStage::Idle => write!(f, "idle"),
            TurnStage::Capturing => write!(f, "capturing"),
            TurnStage::Transcribing => write!(f, "transcribing"),
            TurnStage::Generating => write!(f, "generating"),
            TurnStage::Synthesizing => write!(f, "synthesizing"),
            TurnStage::Playing => write!(f, "playing"),
            TurnStage::Complete => write!(f, "complete"),
        }
    }
}

impl FromStr for TurnStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(TurnStage::Idle),
            "capturing" => Ok(TurnStage::Capturing),
            "transcribing" => Ok(TurnStage::Transcribing),
            "generating" => Ok(TurnStage::Generating),
            "synthesizing" => Ok(TurnStage::Synthesizing),
            "playing" => Ok(TurnStage::Playing),
            "complete" => Ok(TurnStage::Complete),
            other => Err(format!("invalid turn stage: '{other}'")),
        }
    }
}

/// Whether a turn made it into session memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Committed,
    DiscardedBeforeCommit,
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOutcome::Committed => write!(f, "committed"),
            TurnOutcome::DiscardedBeforeCommit => write!(f, "discarded_before_commit"),
        }
    }
}

/// A single conversational exchange.
///
/// Created when a pipeline run has input to work on; immutable once
/// committed to memory. Only turns with both `user_text` and `ai_text`
/// are ever committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub timestamp: DateTime<Utc>,
    pub user_text: Option<String>,
    pub ai_text: Option<String>,
    /// Handle to the synthesized response audio, absent for text-only turns.
    pub audio: Option<AudioRef>,
    /// Persona that generated `ai_text`.
    pub persona: String,
    pub stage_reached: TurnStage,
    pub outcome: TurnOutcome,
}

impl Turn {
    /// Start a new, not-yet-committed turn.
    pub fn begin(id: TurnId, persona: impl Into<String>, stage: TurnStage) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            user_text: None,
            ai_text: None,
            audio: None,
            persona: persona.into(),
            stage_reached: stage,
            outcome: TurnOutcome::DiscardedBeforeCommit,
        }
    }

    /// Whether both sides of the exchange are present.
    pub fn is_complete(&self) -> bool {
        self.user_text.is_some() && self.ai_text.is_some()
    }
}

/// A non-fatal failure the pipeline absorbed while finishing a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub stage: TurnStage,
    pub reason: String,
}

/// What the caller receives for a completed (possibly degraded) turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub turn_id: TurnId,
    pub user_text: String,
    pub ai_text: String,
    /// Synthesized response audio, absent when synthesis failed.
    pub audio: Option<AudioBlob>,
    pub persona: String,
    pub degradations: Vec<Degradation>,
}

impl TurnResult {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Whether the response text is the generation fallback.
    pub fn used_fallback(&self) -> bool {
        self.degradations
            .iter()
            .any(|d| d.stage == TurnStage::Generating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_stage_roundtrip() {
        for stage in [
            TurnStage::Idle,
            TurnStage::Capturing,
            TurnStage::Transcribing,
            TurnStage::Generating,
            TurnStage::Synthesizing,
            TurnStage::Playing,
            TurnStage::Complete,
        ] {
            let s = stage.to_string();
            let parsed: TurnStage = s.parse().unwrap();
            assert_eq!(stage, parsed);
        }
    }

    #[test]
    fn test_turn_stage_order() {
        let mut stage = TurnStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited.len(), 7);
        assert_eq!(stage, TurnStage::Complete);
    }

    #[test]
    fn test_turn_id_serializes_transparently() {
        let json = serde_json::to_string(&TurnId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_begin_turn_is_incomplete_and_uncommitted() {
        let turn = Turn::begin(TurnId(1), "default", TurnStage::Generating);
        assert!(!turn.is_complete());
        assert_eq!(turn.outcome, TurnOutcome::DiscardedBeforeCommit);
        assert!(turn.audio.is_none());
    }

    #[test]
    fn test_turn_outcome_serde() {
        let json = serde_json::to_string(&TurnOutcome::DiscardedBeforeCommit).unwrap();
        assert_eq!(json, "\"discarded_before_commit\"");
    }

    #[test]
    fn test_turn_result_fallback_detection() {
        let result = TurnResult {
            turn_id: TurnId(3),
            user_text: "Hi".to_string(),
            ai_text: "sorry".to_string(),
            audio: None,
            persona: "default".to_string(),
            degradations: vec![Degradation {
                stage: TurnStage::Generating,
                reason: "backend error".to_string(),
            }],
        };
        assert!(result.is_degraded());
        assert!(result.used_fallback());
    }
}
