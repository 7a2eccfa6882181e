use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::{Result, TranscriptionError};
use crate::progress;

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Whisper model sizes this tool knows how to fetch and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    Tiny,
    Base,
    Small,
    #[default]
    Medium,
    LargeV3,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Tiny => "tiny",
            ModelKind::Base => "base",
            ModelKind::Small => "small",
            ModelKind::Medium => "medium",
            ModelKind::LargeV3 => "large-v3",
        }
    }

    /// ggml weights file name, as published upstream.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.name())
    }

    pub fn download_url(&self) -> String {
        format!("{}/{}", MODEL_BASE_URL, self.file_name())
    }

    /// Rough weights size, for the download announcement.
    pub fn approximate_size(&self) -> &'static str {
        match self {
            ModelKind::Tiny => "75 MB",
            ModelKind::Base => "142 MB",
            ModelKind::Small => "466 MB",
            ModelKind::Medium => "1.5 GB",
            ModelKind::LargeV3 => "2.9 GB",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelKind::Tiny),
            "base" => Ok(ModelKind::Base),
            "small" => Ok(ModelKind::Small),
            "medium" => Ok(ModelKind::Medium),
            "large" | "large-v3" => Ok(ModelKind::LargeV3),
            other => Err(format!(
                "unknown model '{}' (expected tiny, base, small, medium or large-v3)",
                other
            )),
        }
    }
}

/// On-disk store for downloaded model weights.
pub struct ModelStore {
    models_dir: PathBuf,
}

impl ModelStore {
    pub fn new(models_dir: PathBuf) -> Self {
        Self { models_dir }
    }

    pub fn model_path(&self, kind: ModelKind) -> PathBuf {
        self.models_dir.join(kind.file_name())
    }

    pub fn is_downloaded(&self, kind: ModelKind) -> bool {
        self.model_path(kind).is_file()
    }

    /// Return the weights path, fetching the file first if it is missing.
    pub async fn ensure_available(&self, kind: ModelKind) -> Result<PathBuf> {
        let path = self.model_path(kind);
        if path.is_file() {
            println!("📦 Model found: {}", kind.file_name());
            return Ok(path);
        }

        println!(
            "🔎 Model not found. Downloading {} (~{})...",
            kind.file_name(),
            kind.approximate_size()
        );
        self.download(kind, &path).await?;
        println!("✅ Download complete");
        Ok(path)
    }

    /// Stream the weights into a `.tmp` staging file, then rename it into
    /// place so a readable weights file is always complete. An interrupted
    /// download leaves only the staging file behind for the remnant sweep.
    async fn download(&self, kind: ModelKind, dest: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.models_dir).await?;

        let response = reqwest::get(kind.download_url())
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TranscriptionError::ModelDownload(e.to_string()))?;

        let bar = progress::download_bar(response.content_length());
        let staging = dest.with_extension("tmp");
        let mut file = File::create(&staging).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TranscriptionError::ModelDownload(e.to_string()))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            bar.set_position(downloaded);
        }

        file.flush().await?;
        drop(file);
        tokio::fs::rename(&staging, dest).await?;
        bar.finish_and_clear();
        Ok(())
    }
}
