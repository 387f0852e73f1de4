//! Application state shared by every CLI command.
//!
//! AppState holds the loaded configuration and the persona registry. Sessions
//! are opened on demand, since only turn-running commands need backend
//! credentials.

use std::path::PathBuf;
use std::sync::Arc;

use colloquy_core::persona::PersonaRegistry;
use colloquy_core::session::ConversationSession;
use colloquy_infra::config::{load_app_config, resolve_data_dir, resolve_output_dir};
use colloquy_infra::openai::api_key_from_env;
use colloquy_infra::openai_gateways;
use colloquy_types::config::AppConfig;
use colloquy_types::persona::PersonaConfig;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<PersonaRegistry>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml` and register personas.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await;
        let registry = build_registry(&config.personas);
        let output_dir = resolve_output_dir(&config, &data_dir);

        Ok(Self {
            registry: Arc::new(registry),
            config,
            data_dir,
            output_dir,
        })
    }

    /// Open a session against the OpenAI backend, optionally starting with
    /// a persona other than the configured default.
    pub fn open_session(&self, persona: Option<&str>) -> anyhow::Result<ConversationSession> {
        let api_key = api_key_from_env()?;
        let gateways = openai_gateways(&self.config.openai, api_key, self.output_dir.clone());

        let mut session_config = self.config.session.clone();
        if let Some(name) = persona {
            session_config.default_persona = name.to_string();
        }
        Ok(ConversationSession::new(
            session_config,
            Arc::clone(&self.registry),
            gateways,
        )?)
    }
}

/// Built-in personas plus those declared in the config file. Config entries
/// replace built-ins with the same name.
pub fn build_registry(custom: &[PersonaConfig]) -> PersonaRegistry {
    let mut registry = PersonaRegistry::new();
    for persona in custom {
        let name = persona.name.clone();
        if registry.register(persona.clone()).is_some() {
            warn!(persona = %name, "Config persona overrides a built-in");
        } else {
            debug!(persona = %name, "Registered config persona");
        }
    }
    registry
}
