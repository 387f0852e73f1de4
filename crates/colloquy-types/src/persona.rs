//! Persona types: a named, fixed combination of system instructions and
//! generation parameters.

use serde::{Deserialize, Serialize};

/// Model parameters a persona generates with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Backend model identifier (e.g., "gpt-3.5-turbo").
    pub model_id: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum number of tokens in a generated response.
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model_id: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 150,
        }
    }
}

/// A registered persona.
///
/// Immutable once registered; sessions hold it behind an `Arc` and swap the
/// whole binding on a persona switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: String,
    pub system_prompt: String,
    #[serde(default)]
    pub model: ModelParameters,
}

impl PersonaConfig {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        model: ModelParameters,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            model,
        }
    }
}
