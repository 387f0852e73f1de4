//! Name-indexed registry of persona configurations.

use std::collections::HashMap;
use std::sync::Arc;

use colloquy_types::error::PersonaNotFoundError;
use colloquy_types::persona::PersonaConfig;

use super::builtin::builtin_personas;

/// Registry of available personas, indexed by name.
///
/// Personas are immutable once registered and handed out as
/// `Arc<PersonaConfig>`, so a session's binding stays valid even if the
/// registry later replaces the entry. Read-only after setup; share it
/// between sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: HashMap<String, Arc<PersonaConfig>>,
}

impl PersonaRegistry {
    /// Create a registry holding the built-in personas.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for persona in builtin_personas() {
            registry.register(persona);
        }
        registry
    }

    /// Create a registry with no personas at all.
    pub fn empty() -> Self {
        Self {
            personas: HashMap::new(),
        }
    }

    /// Register a persona under its own name.
    ///
    /// If a persona with this name already exists, it is replaced and the
    /// previous entry is returned.
    pub fn register(&mut self, persona: PersonaConfig) -> Option<Arc<PersonaConfig>> {
        self.personas
            .insert(persona.name.clone(), Arc::new(persona))
    }

    /// Look up a persona by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<PersonaConfig>, PersonaNotFoundError> {
        self.personas
            .get(name)
            .cloned()
            .ok_or_else(|| PersonaNotFoundError {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.personas.contains_key(name)
    }

    /// All registered persona names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.personas.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All registered personas, sorted by name.
    pub fn personas(&self) -> Vec<Arc<PersonaConfig>> {
        let mut personas: Vec<_> = self.personas.values().cloned().collect();
        personas.sort_by(|a, b| a.name.cmp(&b.name));
        personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
