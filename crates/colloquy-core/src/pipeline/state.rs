//! Turn state machine.
//!
//! Tracks which stage a single pipeline run is in and rejects transitions
//! that skip or reorder stages. The legal paths are:
//!
//! ```text
//! Idle -> Capturing -> Transcribing -> Generating -> Synthesizing -> Playing -> Complete
//! Idle -> Transcribing                  (pre-recorded audio)
//! Idle -> Generating                    (text input)
//! Synthesizing -> Complete              (no audio to play)
//! any non-terminal stage -> Failed
//! ```
//!
//! `Complete` and `Failed` are terminal.

use colloquy_types::error::TurnError;
use colloquy_types::turn::TurnStage;

/// Why a pipeline run ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Capture,
    Transcription,
    Cancelled,
    /// A commit or transition invariant was violated.
    Invariant,
}

impl From<&TurnError> for FailureKind {
    fn from(err: &TurnError) -> Self {
        match err {
            TurnError::Capture(_) => FailureKind::Capture,
            TurnError::Transcription(_) => FailureKind::Transcription,
            TurnError::Cancelled { .. } => FailureKind::Cancelled,
            _ => FailureKind::Invariant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Active(TurnStage),
    Failed { stage: TurnStage, kind: FailureKind },
}

/// State of one pipeline run. Created fresh for every turn.
#[derive(Debug, Clone)]
pub struct TurnStateMachine {
    state: PipelineState,
    visited: Vec<TurnStage>,
}

impl TurnStateMachine {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Active(TurnStage::Idle),
            visited: vec![TurnStage::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The current stage, or the stage the run failed in.
    pub fn stage(&self) -> TurnStage {
        match self.state {
            PipelineState::Active(stage) => stage,
            PipelineState::Failed { stage, .. } => stage,
        }
    }

    /// Every stage entered so far, in order.
    pub fn visited(&self) -> &[TurnStage] {
        &self.visited
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            PipelineState::Active(TurnStage::Complete) | PipelineState::Failed { .. }
        )
    }

    pub fn can_enter(&self, to: TurnStage) -> bool {
        let PipelineState::Active(from) = self.state else {
            return false;
        };
        if from.next() == Some(to) {
            return true;
        }
        matches!(
            (from, to),
            (TurnStage::Idle, TurnStage::Transcribing)
                | (TurnStage::Idle, TurnStage::Generating)
                | (TurnStage::Synthesizing, TurnStage::Complete)
        )
    }

    /// Move to `to`, or fail with [`TurnError::IllegalTransition`].
    pub fn enter(&mut self, to: TurnStage) -> Result<(), TurnError> {
        if !self.can_enter(to) {
            return Err(TurnError::IllegalTransition {
                from: self.stage(),
                to,
            });
        }
        self.state = PipelineState::Active(to);
        self.visited.push(to);
        Ok(())
    }

    /// Mark the run failed at its current stage and return that stage.
    ///
    /// Failing an already failed run keeps the first failure.
    pub fn fail(&mut self, kind: FailureKind) -> TurnStage {
        let stage = self.stage();
        if let PipelineState::Active(_) = self.state {
            self.state = PipelineState::Failed { stage, kind };
        }
        stage
    }
}

impl Default for TurnStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::error::CaptureError;

    #[test]
    fn full_voice_path_is_legal() {
        let mut machine = TurnStateMachine::new();
        for stage in [
            TurnStage::Capturing,
            TurnStage::Transcribing,
            TurnStage::Generating,
            TurnStage::Synthesizing,
            TurnStage::Playing,
            TurnStage::Complete,
        ] {
            machine.enter(stage).unwrap();
        }
        assert!(machine.is_terminal());
        assert_eq!(machine.visited().len(), 7);
    }

    #[test]
    fn text_path_skips_capture_and_transcription() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Generating).unwrap();
        machine.enter(TurnStage::Synthesizing).unwrap();
        machine.enter(TurnStage::Complete).unwrap();
        assert_eq!(machine.state(), PipelineState::Active(TurnStage::Complete));
    }

    #[test]
    fn prerecorded_path_starts_at_transcribing() {
        let mut machine = TurnStateMachine::new();
        assert!(machine.can_enter(TurnStage::Transcribing));
        machine.enter(TurnStage::Transcribing).unwrap();
        assert!(!machine.can_enter(TurnStage::Synthesizing));
    }

    #[test]
    fn skipping_stages_is_rejected() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Capturing).unwrap();
        let err = machine.enter(TurnStage::Generating).unwrap_err();
        assert!(matches!(
            err,
            TurnError::IllegalTransition {
                from: TurnStage::Capturing,
                to: TurnStage::Generating
            }
        ));
        assert_eq!(machine.stage(), TurnStage::Capturing);
    }

    #[test]
    fn going_backwards_is_rejected() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Generating).unwrap();
        assert!(machine.enter(TurnStage::Transcribing).is_err());
        assert!(machine.enter(TurnStage::Generating).is_err());
    }

    #[test]
    fn failed_is_terminal() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Capturing).unwrap();
        let kind = FailureKind::from(&TurnError::from(CaptureError::Interrupted));

        assert_eq!(machine.fail(kind), TurnStage::Capturing);
        assert!(machine.is_terminal());
        assert!(machine.enter(TurnStage::Transcribing).is_err());
        assert_eq!(
            machine.state(),
            PipelineState::Failed {
                stage: TurnStage::Capturing,
                kind: FailureKind::Capture
            }
        );
    }

    #[test]
    fn second_failure_keeps_first_kind() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Generating).unwrap();
        machine.fail(FailureKind::Cancelled);
        machine.fail(FailureKind::Invariant);
        assert!(matches!(
            machine.state(),
            PipelineState::Failed {
                kind: FailureKind::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn complete_accepts_no_transitions() {
        let mut machine = TurnStateMachine::new();
        machine.enter(TurnStage::Generating).unwrap();
        machine.enter(TurnStage::Synthesizing).unwrap();
        machine.enter(TurnStage::Complete).unwrap();
        assert!(!machine.can_enter(TurnStage::Playing));
    }
}
