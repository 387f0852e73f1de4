use std::time::Duration;

use colloquy_core::gateway::SpeechCapture;
use colloquy_types::audio::AudioBlob;
use colloquy_types::error::CaptureError;

/// Capture device used when no microphone backend is compiled in.
///
/// Every capture fails with [`CaptureError::DeviceUnavailable`], which the
/// pipeline treats as permanent, so prerecorded audio and text input remain
/// the only ways into a session.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl NoCapture {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechCapture for NoCapture {
    fn name(&self) -> &str {
        "none"
    }

    async fn capture(&self, _duration: Duration) -> Result<AudioBlob, CaptureError> {
        Err(CaptureError::DeviceUnavailable(
            "no microphone backend available; use text or audio files".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_is_permanently_unavailable() {
        let err = NoCapture::new()
            .capture(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
        assert!(!err.is_transient());
    }
}
