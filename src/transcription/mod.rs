//! Speech-to-text through the whisper.cpp bindings: model catalog and
//! download store, plus the engine that owns the loaded context.

pub mod model;
pub mod whisper;

pub use model::{ModelKind, ModelStore};
pub use whisper::{Transcript, TranscriptionEngine};

/// Result type for transcription operations
pub type Result<T> = std::result::Result<T, TranscriptionError>;

/// Error types for transcription operations
#[derive(thiserror::Error, Debug)]
pub enum TranscriptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model download failed: {0}")]
    ModelDownload(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Whisper error: {0}")]
    Whisper(String),
}
