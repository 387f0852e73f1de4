//! Mirror of a session's event bus into the trace.
//!
//! The session and pipeline already log each transition where it happens.
//! This logger records the same stream as it was published, under the
//! `colloquy::events` target at `debug`, so it can be enabled on its own
//! with `RUST_LOG=colloquy::events=debug`.

use colloquy_types::event::TurnEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const TARGET: &str = "colloquy::events";

/// Record a single event.
pub fn log_event(event: &TurnEvent) {
    match event {
        TurnEvent::StageEntered {
            session_id,
            turn_id,
            stage,
        } => {
            debug!(target: TARGET, %session_id, turn_id = turn_id.map(|t| t.0), %stage, "stage_entered");
        }
        TurnEvent::StageDegraded {
            session_id,
            turn_id,
            stage,
            reason,
        } => {
            debug!(target: TARGET, %session_id, turn_id = turn_id.0, %stage, %reason, "stage_degraded");
        }
        TurnEvent::TurnCommitted {
            session_id,
            turn_id,
            persona,
            degraded,
        } => {
            debug!(target: TARGET, %session_id, turn_id = turn_id.0, %persona, degraded, "turn_committed");
        }
        TurnEvent::TurnDiscarded {
            session_id,
            turn_id,
            stage,
            reason,
        } => {
            debug!(
                target: TARGET,
                %session_id,
                turn_id = turn_id.map(|t| t.0),
                %stage,
                %reason,
                "turn_discarded"
            );
        }
        TurnEvent::PersonaSwitched {
            session_id,
            from,
            to,
            memory_preserved,
        } => {
            debug!(target: TARGET, %session_id, %from, %to, memory_preserved, "persona_switched");
        }
        TurnEvent::MemoryCleared {
            session_id,
            discarded_turns,
        } => {
            debug!(target: TARGET, %session_id, discarded_turns, "memory_cleared");
        }
        TurnEvent::SessionClosed { session_id } => {
            debug!(target: TARGET, %session_id, "session_closed");
        }
    }
}

/// Log every event received until the bus is dropped.
///
/// Returns the number of events logged when the channel closes.
pub async fn run_event_logger(mut rx: broadcast::Receiver<TurnEvent>) -> u64 {
    let mut logged = 0u64;
    loop {
        match rx.recv().await {
            Ok(event) => {
                log_event(&event);
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: TARGET, skipped, "Event logger lagged; events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    logged
}

/// Spawn [`run_event_logger`] on the current runtime.
pub fn spawn_event_logger(rx: broadcast::Receiver<TurnEvent>) -> JoinHandle<u64> {
    tokio::spawn(run_event_logger(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::turn::{TurnId, TurnStage};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_logger_drains_until_closed() {
        let (tx, rx) = broadcast::channel(16);
        let handle = spawn_event_logger(rx);
        let session_id = Uuid::now_v7();

        tx.send(TurnEvent::StageDegraded {
            session_id,
            turn_id: TurnId(1),
            stage: TurnStage::Synthesizing,
            reason: "tts down".to_string(),
        })
        .unwrap();
        tx.send(TurnEvent::SessionClosed { session_id }).unwrap();
        drop(tx);

        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_logger_survives_lag() {
        let (tx, rx) = broadcast::channel(2);
        let session_id = Uuid::now_v7();
        for n in 0..5 {
            tx.send(TurnEvent::MemoryCleared {
                session_id,
                discarded_turns: n,
            })
            .unwrap();
        }
        drop(tx);

        // The two newest events survive the overflow.
        assert_eq!(run_event_logger(rx).await, 2);
    }
}
