//! Conversation orchestration for Colloquy.
//!
//! This crate defines the gateway traits ("ports") that the infrastructure
//! layer implements, plus the turn pipeline, session memory, persona registry
//! and the conversation session that ties them together. It depends only on
//! `colloquy-types`, never on `colloquy-infra` or any network/device crate.

pub mod event;
pub mod gateway;
pub mod memory;
pub mod persona;
pub mod pipeline;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
