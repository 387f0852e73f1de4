//! Persona registry: named system prompts and generation parameters.

pub mod builtin;
pub mod registry;

pub use registry::PersonaRegistry;
