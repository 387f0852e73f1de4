//! Audio payload types exchanged with the capture, transcription,
//! synthesis, and playback gateways.
//!
//! An [`AudioBlob`] owns the encoded bytes and is cheap to clone. Committed
//! turns only keep an [`AudioRef`] so history never holds audio data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Container/codec of an audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Flac,
    M4a,
    Webm,
}

impl AudioFormat {
    /// Conventional file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::M4a => "m4a",
            AudioFormat::Webm => "webm",
        }
    }

    /// MIME type used when uploading the payload.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Webm => "audio/webm",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "wav" | "wave" => Ok(AudioFormat::Wav),
            "mp3" | "mpeg" => Ok(AudioFormat::Mp3),
            "ogg" | "oga" => Ok(AudioFormat::Ogg),
            "flac" => Ok(AudioFormat::Flac),
            "m4a" | "mp4" => Ok(AudioFormat::M4a),
            "webm" => Ok(AudioFormat::Webm),
            other => Err(format!("unsupported audio format: '{other}'")),
        }
    }
}

/// An encoded audio payload.
///
/// The bytes are shared (`Arc<[u8]>`), so clones do not copy audio data.
#[derive(Clone)]
pub struct AudioBlob {
    id: Uuid,
    format: AudioFormat,
    data: Arc<[u8]>,
}

impl AudioBlob {
    /// Wrap encoded bytes in a new blob with a fresh identifier.
    pub fn new(format: AudioFormat, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            format,
            data: data.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lightweight handle recorded on a committed turn.
    pub fn to_ref(&self) -> AudioRef {
        AudioRef {
            id: self.id,
            format: self.format,
            byte_len: self.data.len(),
        }
    }
}

impl fmt::Debug for AudioBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBlob")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("byte_len", &self.data.len())
            .finish()
    }
}

/// Metadata-only reference to an [`AudioBlob`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub id: Uuid,
    pub format: AudioFormat,
    pub byte_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_from_extension() {
        assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert_eq!(".MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!("oga".parse::<AudioFormat>().unwrap(), AudioFormat::Ogg);
        assert!("aiff".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_audio_format_serde() {
        let json = serde_json::to_string(&AudioFormat::M4a).unwrap();
        assert_eq!(json, "\"m4a\"");
    }

    #[test]
    fn test_blob_clone_shares_bytes() {
        let blob = AudioBlob::new(AudioFormat::Wav, vec![1u8, 2, 3]);
        let copy = blob.clone();
        assert_eq!(copy.id(), blob.id());
        assert!(std::ptr::eq(copy.bytes().as_ptr(), blob.bytes().as_ptr()));
    }

    #[test]
    fn test_blob_to_ref() {
        let blob = AudioBlob::new(AudioFormat::Mp3, vec![0u8; 42]);
        let r = blob.to_ref();
        assert_eq!(r.id, blob.id());
        assert_eq!(r.format, AudioFormat::Mp3);
        assert_eq!(r.byte_len, 42);
    }

    #[test]
    fn test_blob_debug_omits_bytes() {
        let blob = AudioBlob::new(AudioFormat::Ogg, vec![7u8; 4]);
        let debug = format!("{blob:?}");
        assert!(debug.contains("byte_len: 4"));
        assert!(!debug.contains("[7, 7"));
    }
}
