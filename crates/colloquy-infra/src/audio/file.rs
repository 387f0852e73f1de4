//! Loading prerecorded audio from disk.

use std::path::{Path, PathBuf};

use colloquy_types::audio::{AudioBlob, AudioFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioFileError {
    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported audio format for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read an audio file, inferring its format from the extension.
pub async fn load_audio_file(path: &Path) -> Result<AudioBlob, AudioFileError> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<AudioFormat>().ok())
        .ok_or_else(|| AudioFileError::UnsupportedFormat(path.to_path_buf()))?;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AudioFileError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(AudioFileError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    tracing::debug!(path = %path.display(), %format, bytes = bytes.len(), "Loaded audio file");
    Ok(AudioBlob::new(format, bytes))
}
