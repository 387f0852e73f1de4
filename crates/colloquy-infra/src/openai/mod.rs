//! OpenAI-backed gateways.
//!
//! Chat completions go through [`async_openai`]; the speech endpoints
//! (`/audio/transcriptions`, `/audio/speech`) are called with `reqwest`
//! directly. All three share one API key and base URL.
//!
//! The API key is held as a [`SecretString`] and only exposed when building
//! request headers. None of the adapters derive `Debug`.

pub mod generator;
pub mod synthesizer;
pub mod transcriber;

use secrecy::SecretString;
use thiserror::Error;

pub use generator::OpenAiGenerator;
pub use synthesizer::OpenAiSynthesizer;
pub use transcriber::OpenAiTranscriber;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Read the API key from `OPENAI_API_KEY`.
///
/// Blank values count as missing.
pub fn api_key_from_env() -> Result<SecretString, CredentialError> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key.trim().to_string())),
        _ => Err(CredentialError::Missing(API_KEY_ENV)),
    }
}

/// Join a base URL and an endpoint path without doubling the slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Format a non-success HTTP response for an error message.
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {status}");
    }
    let mut end = body.len().min(MAX_ERROR_BODY);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("HTTP {status}: {}", &body[..end])
}
