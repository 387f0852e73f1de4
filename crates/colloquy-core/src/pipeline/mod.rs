//! The turn pipeline and its state machine.

pub mod runner;
pub mod state;

use std::sync::atomic::{AtomicU64, Ordering};

use colloquy_types::turn::TurnId;

pub use runner::{GENERATION_FALLBACK, PipelineDeps, TurnInput, TurnPipeline, normalize_transcript};
pub use state::{FailureKind, PipelineState, TurnStateMachine};

/// Session-scoped source of turn ids.
///
/// Ids start at 1 and are never reused, even across memory clears, so a
/// discarded attempt simply leaves a gap.
#[derive(Debug, Default)]
pub struct TurnIdSequence {
    last: AtomicU64,
}

impl TurnIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> TurnId {
        TurnId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued id, if any.
    pub fn last_issued(&self) -> Option<TurnId> {
        match self.last.load(Ordering::Relaxed) {
            0 => None,
            n => Some(TurnId(n)),
        }
    }
}
