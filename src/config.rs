use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transcription::ModelKind;

/// Configuration for the video transcriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Working directory layout
    pub directories: DirectoriesConfig,

    /// Audio extraction settings
    pub audio: AudioConfig,

    /// Transcription settings
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    /// Directory scanned for input videos
    pub videos_dir: PathBuf,

    /// Directory holding downloaded model weights
    pub models_dir: PathBuf,

    /// Directory transcripts are written to
    pub transcripts_dir: PathBuf,

    /// Scratch directory for extracted audio
    pub temp_audio_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// FFmpeg binary to invoke
    pub ffmpeg_path: String,

    /// Target sample rate for transcription
    pub sample_rate: u32,

    /// Number of audio channels in the extracted file
    pub channels: u32,

    /// Audio codec passed to FFmpeg
    pub codec: String,

    /// Container format for extracted audio
    pub format: String,

    /// Hard limit for a single FFmpeg run (seconds)
    pub extraction_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model size to load (tiny, base, small, medium, large-v3)
    pub model: String,

    /// Language hint; None lets the model detect it
    pub language: Option<String>,

    /// Decoder threads
    pub threads: usize,

    /// Enable GPU acceleration for Whisper
    pub use_gpu: bool,

    /// Initial decoding temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Step added to the temperature on each fallback re-decode
    pub temperature_increment: f32,

    /// Probability above which a segment is treated as silence
    pub no_speech_threshold: f32,

    /// Mean log-probability below which a decode is retried
    pub logprob_threshold: f32,

    /// Entropy gate against degenerate repetitive output
    pub entropy_threshold: f32,

    /// Feed previous text back into the decoder
    pub condition_on_previous_text: bool,

    /// Suppress blank outputs at the start of a segment
    pub suppress_blank: bool,

    /// Maximum allowed timestamp for the first token (seconds)
    pub max_initial_timestamp: f32,

    /// Compute per-token timestamps
    pub word_timestamps: bool,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "video-transcriber.toml",
            "config/video-transcriber.toml",
            "~/.config/video-transcriber/config.toml",
            "/etc/video-transcriber/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to defaults with environment overrides
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("VIDEO_TRANSCRIBER_MODEL") {
            model
                .parse::<ModelKind>()
                .map_err(|e| anyhow!("VIDEO_TRANSCRIBER_MODEL: {}", e))?;
            config.transcription.model = model;
        }

        if let Ok(language) = std::env::var("VIDEO_TRANSCRIBER_LANGUAGE") {
            config.transcription.language = Some(language);
        }

        if let Ok(videos_dir) = std::env::var("VIDEO_TRANSCRIBER_VIDEOS_DIR") {
            config.directories.videos_dir = PathBuf::from(videos_dir);
        }

        if let Ok(transcripts_dir) = std::env::var("VIDEO_TRANSCRIBER_TRANSCRIPTS_DIR") {
            config.directories.transcripts_dir = PathBuf::from(transcripts_dir);
        }

        if let Ok(sample_rate) = std::env::var("VIDEO_TRANSCRIBER_SAMPLE_RATE") {
            config.audio.sample_rate = sample_rate.parse().unwrap_or(16000);
        }

        if let Ok(timeout) = std::env::var("VIDEO_TRANSCRIBER_EXTRACTION_TIMEOUT") {
            config.audio.extraction_timeout_secs = timeout.parse().unwrap_or(600);
        }

        if let Ok(threads) = std::env::var("VIDEO_TRANSCRIBER_THREADS") {
            if let Ok(threads) = threads.parse() {
                config.transcription.threads = threads;
            }
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Re-root relative directories against a project directory
    pub fn anchor_directories(&mut self, root: &Path) {
        let dirs = [
            &mut self.directories.videos_dir,
            &mut self.directories.models_dir,
            &mut self.directories.transcripts_dir,
            &mut self.directories.temp_audio_dir,
        ];
        for dir in dirs {
            if dir.is_relative() {
                let anchored = root.join(dir.as_path());
                *dir = anchored;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(anyhow!("sample_rate must be greater than 0"));
        }

        if self.audio.channels == 0 {
            return Err(anyhow!("channels must be greater than 0"));
        }

        if self.audio.extraction_timeout_secs == 0 {
            return Err(anyhow!("extraction_timeout_secs must be greater than 0"));
        }

        self.transcription
            .model
            .parse::<ModelKind>()
            .map_err(|e| anyhow!("Invalid transcription model: {}", e))?;

        if self.transcription.threads == 0 {
            return Err(anyhow!("threads must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.transcription.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 1.0"));
        }

        if self.transcription.temperature_increment <= 0.0 {
            return Err(anyhow!("temperature_increment must be greater than 0.0"));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Transcriber Configuration:\n\
            - Videos Directory: {}\n\
            - Transcripts Directory: {}\n\
            - Model: {}\n\
            - Language: {}\n\
            - Audio: {} Hz, {} channel(s), {}\n\
            - Extraction Timeout: {}s\n\
            - Threads: {}",
            self.directories.videos_dir.display(),
            self.directories.transcripts_dir.display(),
            self.transcription.model,
            self.transcription.language.as_deref().unwrap_or("auto-detect"),
            self.audio.sample_rate,
            self.audio.channels,
            self.audio.codec,
            self.audio.extraction_timeout_secs,
            self.transcription.threads,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directories: DirectoriesConfig {
                videos_dir: PathBuf::from("videos"),
                models_dir: PathBuf::from("models"),
                transcripts_dir: PathBuf::from("transcripts"),
                temp_audio_dir: PathBuf::from("temp_audios"),
            },
            audio: AudioConfig {
                ffmpeg_path: "ffmpeg".to_string(),
                sample_rate: 16000, // Optimal for Whisper
                channels: 1,
                codec: "pcm_s16le".to_string(),
                format: "wav".to_string(),
                extraction_timeout_secs: 600,
            },
            transcription: TranscriptionConfig {
                model: ModelKind::default().to_string(),
                language: None,
                threads: num_cpus::get().min(8), // Use available cores, max 8
                use_gpu: false,
                temperature: 0.0,
                temperature_increment: 0.2,
                no_speech_threshold: 0.5,
                logprob_threshold: -0.8,
                entropy_threshold: 2.0,
                condition_on_previous_text: true,
                suppress_blank: true,
                max_initial_timestamp: 1.0,
                word_timestamps: true,
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.config.transcription.model = model.to_string();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.config.transcription.language = language;
        self
    }

    pub fn with_videos_dir(mut self, dir: PathBuf) -> Self {
        self.config.directories.videos_dir = dir;
        self
    }

    pub fn with_transcripts_dir(mut self, dir: PathBuf) -> Self {
        self.config.directories.transcripts_dir = dir;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.audio.sample_rate = sample_rate;
        self
    }

    pub fn with_extraction_timeout(mut self, secs: u64) -> Self {
        self.config.audio.extraction_timeout_secs = secs;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.transcription.threads = threads;
        self
    }

    pub fn with_gpu(mut self, enable: bool) -> Self {
        self.config.transcription.use_gpu = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.channels, 1);
        assert_eq!(config.audio.extraction_timeout_secs, 600);
        assert_eq!(config.transcription.model, "medium");
        assert!(config.transcription.language.is_none());
        assert!(config.transcription.word_timestamps);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_model(ModelKind::Small)
            .with_language(Some("pt".to_string()))
            .with_sample_rate(44100)
            .with_extraction_timeout(120)
            .build();

        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.transcription.language.as_deref(), Some("pt"));
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.extraction_timeout_secs, 120);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transcription.model = "gigantic".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transcription.temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_anchor_directories() {
        let mut config = Config::default();
        config.anchor_directories(Path::new("/srv/media"));
        assert_eq!(
            config.directories.videos_dir,
            PathBuf::from("/srv/media/videos")
        );

        // Absolute paths stay put
        let mut config = Config::default();
        config.directories.models_dir = PathBuf::from("/opt/models");
        config.anchor_directories(Path::new("/srv/media"));
        assert_eq!(config.directories.models_dir, PathBuf::from("/opt/models"));
    }
}
