//! Built-in personas registered with every [`PersonaRegistry`](super::PersonaRegistry).

use colloquy_types::persona::{ModelParameters, PersonaConfig};

pub const DEFAULT: &str = "default";
pub const CREATIVE: &str = "creative";
pub const TECHNICAL: &str = "technical";

const DEFAULT_PROMPT: &str = "You are a helpful and friendly AI assistant. \
Keep your responses concise and relevant.";

const CREATIVE_PROMPT: &str = "You are a highly creative and imaginative AI assistant. \
Feel free to invent scenarios, tell stories, or offer unique perspectives. \
Be whimsical and engaging.";

const TECHNICAL_PROMPT: &str = "You are a precise and knowledgeable technical AI assistant. \
Focus on providing accurate, detailed, and factual information. \
Avoid speculation and clearly state when information is beyond your current knowledge.";

/// The personas every registry starts with, in display order.
pub fn builtin_personas() -> Vec<PersonaConfig> {
    vec![
        PersonaConfig::new(DEFAULT, DEFAULT_PROMPT, ModelParameters::default()),
        PersonaConfig::new(
            CREATIVE,
            CREATIVE_PROMPT,
            ModelParameters {
                temperature: 0.9,
                ..ModelParameters::default()
            },
        ),
        PersonaConfig::new(
            TECHNICAL,
            TECHNICAL_PROMPT,
            ModelParameters {
                temperature: 0.3,
                ..ModelParameters::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_have_distinct_names_and_prompts() {
        let personas = builtin_personas();
        assert_eq!(personas.len(), 3);
        assert_eq!(personas[0].name, DEFAULT);
        assert_eq!(personas[1].name, CREATIVE);
        assert_eq!(personas[2].name, TECHNICAL);
        assert_ne!(personas[0].system_prompt, personas[1].system_prompt);
        assert_ne!(personas[1].system_prompt, personas[2].system_prompt);
    }

    #[test]
    fn creative_runs_hotter_than_technical() {
        let personas = builtin_personas();
        assert!(personas[1].model.temperature > personas[2].model.temperature);
        assert!(personas[0].system_prompt.starts_with("You are a helpful"));
    }
}
