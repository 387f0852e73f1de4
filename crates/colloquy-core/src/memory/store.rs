//! Ordered, append-only store of committed turns.
//!
//! Only fully completed turns (both user and assistant text present) are
//! accepted, in strictly increasing id order. The retention policy decides
//! which committed turns are rendered into generator context; history itself
//! is never trimmed, so `turns()` always returns everything committed since
//! the last clear.

use colloquy_types::config::RetentionPolicy;
use colloquy_types::context::ContextMessage;
use colloquy_types::error::MemoryError;
use colloquy_types::turn::{Turn, TurnId, TurnOutcome};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    turns: Vec<Turn>,
    retention: RetentionPolicy,
}

impl MemoryStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            turns: Vec::new(),
            retention,
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Commit a completed turn.
    ///
    /// The stored turn is marked [`TurnOutcome::Committed`]. Incomplete turns
    /// and ids not greater than the last committed id are rejected.
    pub fn append(&mut self, mut turn: Turn) -> Result<(), MemoryError> {
        if !turn.is_complete() {
            return Err(MemoryError::IncompleteTurn(turn.id));
        }
        if let Some(last) = self.last_id() {
            if turn.id <= last {
                return Err(MemoryError::OutOfOrder {
                    turn_id: turn.id,
                    last,
                });
            }
        }
        turn.outcome = TurnOutcome::Committed;
        self.turns.push(turn);
        Ok(())
    }

    /// Render the turns visible under the retention policy as alternating
    /// user/assistant messages, oldest first.
    pub fn snapshot_as_context(&self) -> Vec<ContextMessage> {
        let mut messages = Vec::with_capacity(self.visible_turns().len() * 2);
        for turn in self.visible_turns() {
            if let (Some(user), Some(ai)) = (&turn.user_text, &turn.ai_text) {
                messages.push(ContextMessage::user(user.as_str()));
                messages.push(ContextMessage::assistant(ai.as_str()));
            }
        }
        messages
    }

    /// Committed turns that the retention policy exposes as context.
    pub fn visible_turns(&self) -> &[Turn] {
        &self.turns[self.retention.first_visible(self.turns.len())..]
    }

    /// Every committed turn, in commit order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Drop all committed turns, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.turns.len();
        self.turns.clear();
        discarded
    }

    pub fn last_id(&self) -> Option<TurnId> {
        self.turns.last().map(|t| t.id)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::context::MessageRole;
    use colloquy_types::turn::TurnStage;

    fn complete_turn(id: u64, user: &str, ai: &str) -> Turn {
        let mut turn = Turn::begin(TurnId(id), "default", TurnStage::Complete);
        turn.user_text = Some(user.to_string());
        turn.ai_text = Some(ai.to_string());
        turn
    }

    #[test]
    fn append_marks_turn_committed() {
        let mut store = MemoryStore::default();
        store.append(complete_turn(1, "Hi", "Hello")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.turns()[0].outcome, TurnOutcome::Committed);
    }

    #[test]
    fn append_rejects_incomplete_turn() {
        let mut store = MemoryStore::default();
        let mut turn = Turn::begin(TurnId(1), "default", TurnStage::Generating);
        turn.user_text = Some("Hi".to_string());

        let err = store.append(turn).unwrap_err();
        assert_eq!(err, MemoryError::IncompleteTurn(TurnId(1)));
        assert!(store.is_empty());
    }

    #[test]
    fn append_rejects_out_of_order_ids() {
        let mut store = MemoryStore::default();
        store.append(complete_turn(3, "a", "b")).unwrap();

        let err = store.append(complete_turn(3, "c", "d")).unwrap_err();
        assert_eq!(
            err,
            MemoryError::OutOfOrder {
                turn_id: TurnId(3),
                last: TurnId(3)
            }
        );
        assert!(store.append(complete_turn(2, "c", "d")).is_err());
        assert!(store.append(complete_turn(4, "c", "d")).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_alternates_roles_oldest_first() {
        let mut store = MemoryStore::default();
        store.append(complete_turn(1, "Hi", "Hello")).unwrap();
        store.append(complete_turn(2, "How are you?", "Fine")).unwrap();

        let context = store.snapshot_as_context();
        assert_eq!(context.len(), 4);
        assert_eq!(context[0].role, MessageRole::User);
        assert_eq!(context[0].content, "Hi");
        assert_eq!(context[1].role, MessageRole::Assistant);
        assert_eq!(context[1].content, "Hello");
        assert_eq!(context[3].content, "Fine");
    }

    #[test]
    fn window_retention_limits_context_not_history() {
        let mut store = MemoryStore::new(RetentionPolicy::Window { turns: 2 });
        for i in 1..=3 {
            store
                .append(complete_turn(i, &format!("u{i}"), &format!("a{i}")))
                .unwrap();
        }

        let context = store.snapshot_as_context();
        assert_eq!(context.len(), 4);
        assert_eq!(context[0].content, "u2");
        assert_eq!(context[3].content, "a3");
        assert_eq!(store.turns().len(), 3);
        assert_eq!(store.visible_turns().len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = MemoryStore::default();
        store.append(complete_turn(1, "Hi", "Hello")).unwrap();

        assert_eq!(store.clear(), 1);
        assert_eq!(store.clear(), 0);
        assert!(store.is_empty());
        assert!(store.snapshot_as_context().is_empty());
        assert_eq!(store.last_id(), None);
    }

    #[test]
    fn empty_store_snapshot_is_empty() {
        let store = MemoryStore::new(RetentionPolicy::Window { turns: 3 });
        assert!(store.snapshot_as_context().is_empty());
        assert!(store.visible_turns().is_empty());
    }
}
