//! Speech-to-text through the OpenAI `/audio/transcriptions` endpoint.

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use colloquy_core::gateway::Transcriber;
use colloquy_types::audio::AudioBlob;
use colloquy_types::config::OpenAiSettings;
use colloquy_types::error::TranscriptionError;

use super::{describe_failure, endpoint};

/// [`Transcriber`] that uploads audio as multipart form data and asks for a
/// plain-text transcript.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: &SecretString, settings: &OpenAiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            url: endpoint(&settings.base_url, "audio/transcriptions"),
            model: settings.whisper_model.clone(),
        }
    }
}

impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai-whisper"
    }

    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, TranscriptionError> {
        let format = audio.format();
        let file = Part::bytes(audio.bytes().to_vec())
            .file_name(format!("speech.{}", format.extension()))
            .mime_str(format.mime_type())
            .map_err(|e| TranscriptionError::Service(e.to_string()))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "text")
            .part("file", file);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Service(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::Service(e.to_string()))?;
        if !status.is_success() {
            return Err(TranscriptionError::Service(describe_failure(status, &body)));
        }

        tracing::debug!(chars = body.len(), model = %self.model, "Transcription received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::audio::AudioFormat;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcriber(server: &MockServer) -> OpenAiTranscriber {
        let settings = OpenAiSettings {
            base_url: server.uri(),
            ..Default::default()
        };
        OpenAiTranscriber::new(&SecretString::from("sk-test".to_string()), &settings)
    }

    #[tokio::test]
    async fn transcribe_posts_multipart_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("What's the weather like?\n"))
            .expect(1)
            .mount(&server)
            .await;

        let audio = AudioBlob::new(AudioFormat::Wav, vec![0u8; 64]);
        let text = transcriber(&server).transcribe(&audio).await.unwrap();

        assert_eq!(text, "What's the weather like?\n");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"model\""));
        assert!(body.contains("whisper-1"));
        assert!(body.contains("filename=\"speech.wav\""));
        assert!(body.contains("name=\"response_format\""));
    }

    #[tokio::test]
    async fn transcribe_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let audio = AudioBlob::new(AudioFormat::Mp3, vec![1u8; 8]);
        let err = transcriber(&server).transcribe(&audio).await.unwrap_err();

        match err {
            TranscriptionError::Service(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("upstream exploded"));
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }
}
