//! Shared domain types for Colloquy.
//!
//! This crate contains the core domain types used across the Colloquy
//! workspace: turns, personas, audio payloads, conversation context,
//! session configuration, lifecycle events, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod audio;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod persona;
pub mod turn;
