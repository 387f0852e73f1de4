//! Local audio plumbing: loading prerecorded files, the file-writing
//! playback sink, and the placeholder capture device.

pub mod capture;
pub mod file;
pub mod player;

pub use capture::NoCapture;
pub use file::{AudioFileError, load_audio_file};
pub use player::FileSinkPlayer;
