/// Video Transcriber
///
/// Batch transcription of local video files: FFmpeg demuxes each video's
/// audio track to mono 16 kHz PCM, a local Whisper model turns it into text,
/// and one transcript file lands per video.

pub mod audio;
pub mod cleanup;
pub mod config;
pub mod menu;
pub mod processing;
pub mod progress;
pub mod report;
pub mod setup;
pub mod transcription;
pub mod video;

// Re-export main types for easy access
pub use crate::audio::AudioExtractor;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::menu::Selection;
pub use crate::processing::{BatchRunner, RunOutcome};
pub use crate::transcription::{ModelKind, ModelStore, Transcript, TranscriptionEngine};
pub use crate::video::VideoScanner;
