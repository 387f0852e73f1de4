//! Configuration loader for Colloquy.
//!
//! Reads `config.toml` from the data directory (`~/.colloquy/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use colloquy_types::config::AppConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "COLLOQUY_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `COLLOQUY_DATA_DIR` environment variable
/// 2. `~/.colloquy`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".colloquy");
    }

    // Last resort: current directory
    PathBuf::from(".colloquy")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the parsed session settings are invalid, logs a warning and keeps the
///   default session settings (other sections are kept).
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    let mut config = match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
    };

    if let Err(err) = config.session.validate() {
        tracing::warn!(
            "Invalid [session] in {}: {err}, using default session settings",
            config_path.display()
        );
        config.session = Default::default();
    }
    config
}

/// Where response audio is written: the configured `output_dir`, or
/// `{data_dir}/audio/output`.
pub fn resolve_output_dir(config: &AppConfig, data_dir: &Path) -> PathBuf {
    config
        .output_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("audio").join("output"))
}
