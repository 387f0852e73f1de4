//! Text-to-speech through the OpenAI `/audio/speech` endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use colloquy_core::gateway::Synthesizer;
use colloquy_types::audio::{AudioBlob, AudioFormat};
use colloquy_types::config::OpenAiSettings;
use colloquy_types::error::SynthesisError;

use super::{describe_failure, endpoint};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// [`Synthesizer`] returning MP3 speech for the configured voice.
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    model: String,
    voice: String,
}

impl OpenAiSynthesizer {
    const FORMAT: AudioFormat = AudioFormat::Mp3;

    pub fn new(api_key: &SecretString, settings: &OpenAiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            url: endpoint(&settings.base_url, "audio/speech"),
            model: settings.tts_model.clone(),
            voice: settings.tts_voice.clone(),
        }
    }
}

impl Synthesizer for OpenAiSynthesizer {
    fn name(&self) -> &str {
        "openai-tts"
    }

    async fn synthesize(&self, text: &str) -> Result<AudioBlob, SynthesisError> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: Self::FORMAT.extension(),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthesisError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service(describe_failure(status, &body)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Service(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        tracing::debug!(bytes = bytes.len(), voice = %self.voice, "Speech synthesized");
        Ok(AudioBlob::new(Self::FORMAT, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn synthesizer(server: &MockServer) -> OpenAiSynthesizer {
        let settings = OpenAiSettings {
            base_url: server.uri(),
            tts_voice: "nova".to_string(),
            ..Default::default()
        };
        OpenAiSynthesizer::new(&SecretString::from("sk-test".to_string()), &settings)
    }

    #[tokio::test]
    async fn synthesize_posts_json_and_returns_mp3() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(body_json(serde_json::json!({
                "model": "tts-1",
                "input": "Hello!",
                "voice": "nova",
                "response_format": "mp3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFFu8, 0xFB, 0x90, 0x00]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = synthesizer(&server).synthesize("Hello!").await.unwrap();

        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert_eq!(audio.bytes(), &[0xFFu8, 0xFB, 0x90, 0x00]);
    }

    #[tokio::test]
    async fn synthesize_rejects_empty_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = synthesizer(&server).synthesize("Hello!").await.unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyAudio));
    }

    #[tokio::test]
    async fn synthesize_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = synthesizer(&server).synthesize("Hello!").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Service(ref msg) if msg.contains("429")));
    }
}
