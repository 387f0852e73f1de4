//! Per-session fan-out of [`TurnEvent`]s.
//!
//! Sessions publish whether or not anyone listens. A subscriber sees only
//! events published after it subscribed, in publish order; one that falls
//! more than the bus capacity behind gets `Lagged` and skips ahead.

use colloquy_types::event::TurnEvent;
use tokio::sync::broadcast;

/// Events a slow subscriber may fall behind by before it lags.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TurnEvent>,
    capacity: usize,
}

impl EventBus {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.sender.subscribe()
    }

    /// Send `event` to every live subscriber and return how many there were.
    pub fn publish(&self, event: TurnEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
