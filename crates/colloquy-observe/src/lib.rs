//! Observability for Colloquy: subscriber installation and a logger that
//! turns session events into structured tracing records.

pub mod event_log;
pub mod tracing_setup;
