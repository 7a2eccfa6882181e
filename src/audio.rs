use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

use crate::config::AudioConfig;
use crate::video;

/// Extracts transcription-ready audio from videos by shelling out to FFmpeg.
#[derive(Clone)]
pub struct AudioExtractor {
    config: AudioConfig,
    temp_audio_dir: PathBuf,
}

impl AudioExtractor {
    pub fn new(config: AudioConfig, temp_audio_dir: PathBuf) -> Self {
        Self {
            config,
            temp_audio_dir,
        }
    }

    /// Scratch path for a video's extracted audio: `<base>.wav`.
    pub fn audio_path_for(&self, video_name: &str) -> PathBuf {
        self.temp_audio_dir.join(format!(
            "{}.{}",
            video::base_name(video_name),
            self.config.format
        ))
    }

    /// Extract audio for a named video, returning the scratch path on success.
    pub async fn extract_for_video(
        &self,
        video_path: &Path,
        video_name: &str,
    ) -> Result<Option<PathBuf>> {
        let audio_path = self.audio_path_for(video_name);
        if self.extract(video_path, &audio_path).await? {
            Ok(Some(audio_path))
        } else {
            Ok(None)
        }
    }

    /// Run FFmpeg and validate its output file.
    ///
    /// `Ok(false)` covers everything that fails just this video: missing
    /// source, failed invocation, non-zero exit, timeout, and a missing or
    /// empty output file.
    pub async fn extract(&self, video_path: &Path, audio_path: &Path) -> Result<bool> {
        if !video_path.exists() {
            error!("❌ Video not found: {}", video_path.display());
            return Ok(false);
        }

        if let Some(parent) = audio_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .arg("-i")
            .arg(video_path)
            .arg("-vn") // No video stream
            .arg("-acodec")
            .arg(&self.config.codec)
            .arg("-ar")
            .arg(self.config.sample_rate.to_string())
            .arg("-ac")
            .arg(self.config.channels.to_string())
            .arg("-y") // Overwrite output
            .arg(audio_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "Extracting audio: {} -> {}",
            video_path.display(),
            audio_path.display()
        );

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("❌ Failed to invoke {}: {}", self.config.ffmpeg_path, e);
                return Ok(false);
            }
        };

        let timeout = Duration::from_secs(self.config.extraction_timeout_secs);
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                error!(
                    "⏰ FFmpeg timed out after {}s: {}",
                    self.config.extraction_timeout_secs,
                    video_path.display()
                );
                return Ok(false);
            }
        };

        if !status.success() {
            error!(
                "❌ FFmpeg exited with {} for {}",
                status,
                video_path.display()
            );
            return Ok(false);
        }

        if !output_is_valid(audio_path).await {
            error!(
                "❌ FFmpeg produced no usable output for {}",
                video_path.display()
            );
            return Ok(false);
        }

        Ok(true)
    }
}

/// The extracted file must exist and be non-empty.
async fn output_is_valid(audio_path: &Path) -> bool {
    match tokio::fs::metadata(audio_path).await {
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn extractor_for(dir: &TempDir) -> AudioExtractor {
        AudioExtractor::new(Config::default().audio, dir.path().join("temp_audios"))
    }

    #[test]
    fn test_audio_path_uses_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = extractor_for(&temp_dir);
        assert_eq!(
            extractor.audio_path_for("lecture.mp4"),
            temp_dir.path().join("temp_audios").join("lecture.wav")
        );
    }

    #[tokio::test]
    async fn test_extract_missing_video_fails_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = extractor_for(&temp_dir);

        let video = temp_dir.path().join("missing.mp4");
        let result = extractor
            .extract_for_video(&video, "missing.mp4")
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!extractor.audio_path_for("missing.mp4").exists());
    }

    #[tokio::test]
    async fn test_output_validation() {
        let temp_dir = TempDir::new().unwrap();

        let empty = temp_dir.path().join("empty.wav");
        std::fs::write(&empty, b"").unwrap();
        assert!(!output_is_valid(&empty).await);

        let nonempty = temp_dir.path().join("audio.wav");
        std::fs::write(&nonempty, b"RIFF").unwrap();
        assert!(output_is_valid(&nonempty).await);

        assert!(!output_is_valid(&temp_dir.path().join("absent.wav")).await);
    }
}
