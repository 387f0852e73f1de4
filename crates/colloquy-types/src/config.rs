//! Configuration types for Colloquy.
//!
//! `SessionConfig` is the explicit configuration a conversation session is
//! constructed with. `AppConfig` is the top-level `config.toml` shape that
//! also carries backend settings and custom personas. All fields have
//! sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persona::PersonaConfig;

/// How many committed turns are exposed to the generator as context.
///
/// ```toml
/// [session.retention]
/// kind = "window"
/// turns = 4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Every committed turn.
    Full,
    /// Only the most recent `turns` committed turns.
    Window { turns: usize },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Full
    }
}

impl RetentionPolicy {
    /// Index of the first visible turn out of `total` committed turns.
    pub fn first_visible(&self, total: usize) -> usize {
        match self {
            RetentionPolicy::Full => 0,
            RetentionPolicy::Window { turns } => total.saturating_sub(*turns),
        }
    }
}

/// Upper bound for the capture length and any single timeout, in seconds.
pub const MAX_STAGE_SECS: u64 = 3600;

/// Per-gateway call timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayTimeouts {
    /// Extra time allowed on top of the requested capture duration.
    #[serde(default = "default_capture_grace_secs")]
    pub capture_grace_secs: u64,
    #[serde(default = "default_transcribe_secs")]
    pub transcribe_secs: u64,
    #[serde(default = "default_generate_secs")]
    pub generate_secs: u64,
    #[serde(default = "default_synthesize_secs")]
    pub synthesize_secs: u64,
    #[serde(default = "default_play_secs")]
    pub play_secs: u64,
}

fn default_capture_grace_secs() -> u64 {
    5
}

fn default_transcribe_secs() -> u64 {
    30
}

fn default_generate_secs() -> u64 {
    60
}

fn default_synthesize_secs() -> u64 {
    30
}

fn default_play_secs() -> u64 {
    120
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            capture_grace_secs: default_capture_grace_secs(),
            transcribe_secs: default_transcribe_secs(),
            generate_secs: default_generate_secs(),
            synthesize_secs: default_synthesize_secs(),
            play_secs: default_play_secs(),
        }
    }
}

impl GatewayTimeouts {
    /// Timeout for a capture of the given length. Saturates at
    /// `Duration::MAX` for caller-supplied lengths near the limit.
    pub fn capture(&self, duration: Duration) -> Duration {
        duration.saturating_add(Duration::from_secs(self.capture_grace_secs))
    }

    pub fn transcribe(&self) -> Duration {
        Duration::from_secs(self.transcribe_secs)
    }

    pub fn generate(&self) -> Duration {
        Duration::from_secs(self.generate_secs)
    }

    pub fn synthesize(&self) -> Duration {
        Duration::from_secs(self.synthesize_secs)
    }

    pub fn play(&self) -> Duration {
        Duration::from_secs(self.play_secs)
    }
}

/// Configuration a conversation session is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Persona active when the session starts.
    #[serde(default = "default_persona")]
    pub default_persona: String,

    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Capture length used when a turn does not specify one.
    #[serde(default = "default_capture_duration_secs")]
    pub capture_duration_secs: u64,

    /// Extra capture attempts after a transient capture failure.
    #[serde(default)]
    pub capture_retries: u32,

    #[serde(default)]
    pub timeouts: GatewayTimeouts,
}

fn default_persona() -> String {
    "default".to_string()
}

fn default_capture_duration_secs() -> u64 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_persona: default_persona(),
            retention: RetentionPolicy::default(),
            capture_duration_secs: default_capture_duration_secs(),
            capture_retries: 0,
            timeouts: GatewayTimeouts::default(),
        }
    }
}

impl SessionConfig {
    pub fn capture_duration(&self) -> Duration {
        Duration::from_secs(self.capture_duration_secs)
    }

    /// Reject configurations no session can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_persona.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultPersona);
        }
        if let RetentionPolicy::Window { turns: 0 } = self.retention {
            return Err(ConfigError::EmptyRetentionWindow);
        }
        if self.capture_duration_secs == 0 {
            return Err(ConfigError::ZeroCaptureDuration);
        }
        let t = &self.timeouts;
        for (name, secs) in [
            ("transcribe_secs", t.transcribe_secs),
            ("generate_secs", t.generate_secs),
            ("synthesize_secs", t.synthesize_secs),
            ("play_secs", t.play_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }
        for (name, secs) in [
            ("capture_duration_secs", self.capture_duration_secs),
            ("capture_grace_secs", t.capture_grace_secs),
            ("transcribe_secs", t.transcribe_secs),
            ("generate_secs", t.generate_secs),
            ("synthesize_secs", t.synthesize_secs),
            ("play_secs", t.play_secs),
        ] {
            if secs > MAX_STAGE_SECS {
                return Err(ConfigError::TooLong {
                    name,
                    secs,
                    max: MAX_STAGE_SECS,
                });
            }
        }
        Ok(())
    }
}

/// Settings for the OpenAI-compatible speech and chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_whisper_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            whisper_model: default_whisper_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
        }
    }
}

/// Top-level configuration, loaded from `~/.colloquy/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Where played response audio is written. Defaults to
    /// `{data_dir}/audio/output`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Custom personas registered alongside the built-ins.
    #[serde(default)]
    pub personas: Vec<PersonaConfig>,
}
