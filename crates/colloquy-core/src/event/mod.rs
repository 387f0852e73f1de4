//! Event bus for conversation session observability.
//!
//! Provides an `EventBus` that distributes `TurnEvent` messages to all
//! subscribers via a `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::EventBus;
