use std::path::PathBuf;

use chrono::Utc;
use colloquy_core::gateway::Player;
use colloquy_types::audio::AudioBlob;
use colloquy_types::error::PlaybackError;

/// [`Player`] that writes each response to `response_{timestamp}.{ext}`
/// in an output directory instead of driving a speaker.
#[derive(Debug, Clone)]
pub struct FileSinkPlayer {
    output_dir: PathBuf,
}

impl FileSinkPlayer {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    fn file_path(&self, audio: &AudioBlob) -> PathBuf {
        let ts = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        self.output_dir
            .join(format!("response_{ts}.{}", audio.format().extension()))
    }
}

impl Player for FileSinkPlayer {
    fn name(&self) -> &str {
        "file-sink"
    }

    async fn play(&self, audio: &AudioBlob) -> Result<(), PlaybackError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PlaybackError::Io(e.to_string()))?;

        let path = self.file_path(audio);
        tokio::fs::write(&path, audio.bytes())
            .await
            .map_err(|e| PlaybackError::Io(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "Response audio saved");
        Ok(())
    }
}
