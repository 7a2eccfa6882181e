use anyhow::Result;
use std::path::{Path, PathBuf};

/// File extensions recognized as video input (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 12] = [
    "mp4", "mkv", "avi", "mov", "wmv", "webm", "flv", "m4v", "mpg", "mpeg", "ts", "3gp",
];

/// Finds candidate videos and checks which of them already have a transcript.
#[derive(Clone)]
pub struct VideoScanner {
    videos_dir: PathBuf,
    transcripts_dir: PathBuf,
}

impl VideoScanner {
    pub fn new(videos_dir: PathBuf, transcripts_dir: PathBuf) -> Self {
        Self {
            videos_dir,
            transcripts_dir,
        }
    }

    /// Names of supported video files directly inside the input directory,
    /// sorted lexicographically. Subdirectories are not entered. A missing
    /// input directory yields an empty list.
    pub async fn discover(&self) -> Result<Vec<String>> {
        let mut videos = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.videos_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(videos),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && is_supported(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    videos.push(name.to_string());
                }
            }
        }

        videos.sort();
        Ok(videos)
    }

    /// Split names into (not yet transcribed, already transcribed) by
    /// transcript existence, preserving input order in both lists.
    pub fn classify(&self, names: &[String]) -> (Vec<String>, Vec<String>) {
        let mut pending = Vec::new();
        let mut transcribed = Vec::new();

        for name in names {
            if self.transcript_path(name).exists() {
                transcribed.push(name.clone());
            } else {
                pending.push(name.clone());
            }
        }

        (pending, transcribed)
    }

    /// Full path of a discovered video file.
    pub fn video_path(&self, name: &str) -> PathBuf {
        self.videos_dir.join(name)
    }

    /// Where the transcript for this video lives: `<base>.txt` in the
    /// transcripts directory.
    pub fn transcript_path(&self, video_name: &str) -> PathBuf {
        self.transcripts_dir
            .join(format!("{}.txt", base_name(video_name)))
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }
}

/// Filename without its extension, keying temp audio and transcript files.
pub fn base_name(video_name: &str) -> &str {
    Path::new(video_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(video_name)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Operator hint for an empty (or missing) input directory.
pub fn print_no_videos_hint(videos_dir: &Path) {
    println!("📂 No videos found");
    println!(
        "💡 Put video files in '{}' to get started",
        videos_dir.display()
    );
    println!("📹 Supported formats: {}", SUPPORTED_EXTENSIONS.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scanner_for(dir: &TempDir) -> VideoScanner {
        VideoScanner::new(
            dir.path().join("videos"),
            dir.path().join("transcripts"),
        )
    }

    #[tokio::test]
    async fn test_discover_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let videos_dir = temp_dir.path().join("videos");
        std::fs::create_dir_all(&videos_dir).unwrap();

        std::fs::write(videos_dir.join("b.MKV"), b"x").unwrap();
        std::fs::write(videos_dir.join("a.mp4"), b"x").unwrap();
        std::fs::write(videos_dir.join("c.mov"), b"x").unwrap();
        std::fs::write(videos_dir.join("notes.txt"), b"x").unwrap();

        // Files in subdirectories are out of scope
        let nested = videos_dir.join("clips");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("d.mp4"), b"x").unwrap();

        let scanner = scanner_for(&temp_dir);
        let videos = scanner.discover().await.unwrap();
        assert_eq!(videos, vec!["a.mp4", "b.MKV", "c.mov"]);
    }

    #[tokio::test]
    async fn test_discover_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = scanner_for(&temp_dir);
        let videos = scanner.discover().await.unwrap();
        assert!(videos.is_empty());
    }

    #[test]
    fn test_classify_partitions_by_transcript() {
        let temp_dir = TempDir::new().unwrap();
        let transcripts_dir = temp_dir.path().join("transcripts");
        std::fs::create_dir_all(&transcripts_dir).unwrap();
        std::fs::write(transcripts_dir.join("a.txt"), b"done").unwrap();

        let scanner = scanner_for(&temp_dir);
        let names = vec!["a.mp4".to_string(), "b.mkv".to_string()];
        let (pending, transcribed) = scanner.classify(&names);

        assert_eq!(pending, vec!["b.mkv"]);
        assert_eq!(transcribed, vec!["a.mp4"]);
        assert_eq!(pending.len() + transcribed.len(), names.len());
    }

    #[test]
    fn test_transcript_path_uses_base_name() {
        let scanner = VideoScanner::new(PathBuf::from("videos"), PathBuf::from("transcripts"));
        assert_eq!(
            scanner.transcript_path("lecture.mp4"),
            PathBuf::from("transcripts/lecture.txt")
        );
    }
}
