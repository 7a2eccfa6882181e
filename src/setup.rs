use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;

/// Marker file keeping otherwise-ignored directories in version control.
const KEEP_FILE: &str = ".gitkeep";

/// Verify the environment before any work starts.
///
/// FFmpeg must be runnable; the working directories, their markers, and the
/// ignore file are created as needed. Returns false, after printing
/// remediation steps, when the environment is not ready.
pub async fn verify_prerequisites(config: &Config, project_root: &Path) -> Result<bool> {
    if !ffmpeg_available(&config.audio.ffmpeg_path).await {
        print_ffmpeg_remediation();
        return Ok(false);
    }
    debug!("FFmpeg available");

    ensure_directories(config).await?;
    ensure_gitignore(config, project_root).await?;
    Ok(true)
}

/// Probe `ffmpeg -version`, bounded so a wedged binary cannot hang startup.
pub async fn ffmpeg_available(ffmpeg_path: &str) -> bool {
    let mut probe = Command::new(ffmpeg_path);
    probe.arg("-version");

    match tokio::time::timeout(Duration::from_secs(10), probe.output()).await {
        Ok(Ok(output)) => output.status.success(),
        _ => false,
    }
}

fn print_ffmpeg_remediation() {
    println!("❌ FFmpeg not found");
    println!("\n🛠️ How to fix it:");
    println!("   1. Download FFmpeg: https://ffmpeg.org/download.html");
    println!("   2. Install it (or unpack the archive)");
    println!("   3. Make sure the ffmpeg binary is on your PATH");
}

/// Create the four working directories, each with a `.gitkeep` marker.
pub async fn ensure_directories(config: &Config) -> Result<()> {
    let dirs = [
        &config.directories.videos_dir,
        &config.directories.models_dir,
        &config.directories.transcripts_dir,
        &config.directories.temp_audio_dir,
    ];

    for dir in dirs {
        tokio::fs::create_dir_all(dir).await?;
        let keep = dir.join(KEEP_FILE);
        if !keep.exists() {
            tokio::fs::write(&keep, "").await?;
        }
    }

    debug!("Working directories ready");
    Ok(())
}

/// Keep generated artifacts out of version control while preserving the
/// directory markers. The file is rewritten only when its content is stale.
pub async fn ensure_gitignore(config: &Config, project_root: &Path) -> Result<()> {
    let content = gitignore_content(config);
    let path = project_root.join(".gitignore");

    let current = tokio::fs::read_to_string(&path).await.unwrap_or_default();
    if current != content {
        tokio::fs::write(&path, &content).await?;
        info!("📝 Wrote {}", path.display());
    }
    Ok(())
}

fn gitignore_content(config: &Config) -> String {
    let dirs = [
        &config.directories.videos_dir,
        &config.directories.models_dir,
        &config.directories.transcripts_dir,
        &config.directories.temp_audio_dir,
    ];

    let mut content = String::new();
    for dir in dirs {
        if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
            content.push_str(&format!("{}/*\n!{}/{}\n\n", name, name, KEEP_FILE));
        }
    }
    content.push_str("*.tmp\n");
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_rooted_at(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.anchor_directories(dir.path());
        config
    }

    #[tokio::test]
    async fn test_ensure_directories_creates_markers() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_rooted_at(&temp_dir);

        ensure_directories(&config).await.unwrap();

        for dir in ["videos", "models", "transcripts", "temp_audios"] {
            let path = temp_dir.path().join(dir);
            assert!(path.is_dir(), "{} missing", dir);
            assert!(path.join(".gitkeep").is_file(), "{} marker missing", dir);
        }
    }

    #[tokio::test]
    async fn test_gitignore_content_and_refresh() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_rooted_at(&temp_dir);
        let path = temp_dir.path().join(".gitignore");

        // Stale content gets replaced
        std::fs::write(&path, "old rules\n").unwrap();
        ensure_gitignore(&config, temp_dir.path()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("videos/*"));
        assert!(content.contains("!videos/.gitkeep"));
        assert!(content.contains("models/*"));
        assert!(content.contains("transcripts/*"));
        assert!(content.contains("temp_audios/*"));
        assert!(content.contains("*.tmp"));

        // A second pass leaves identical content in place
        ensure_gitignore(&config, temp_dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[tokio::test]
    async fn test_ffmpeg_probe_missing_binary() {
        assert!(!ffmpeg_available("/nonexistent/ffmpeg-binary").await);
    }
}
