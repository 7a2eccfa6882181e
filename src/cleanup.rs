use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::report::pluralize;

/// Delete one temporary audio file. Fine if it is already gone.
pub async fn remove_audio(audio_path: &Path) -> Result<()> {
    match tokio::fs::remove_file(audio_path).await {
        Ok(()) => {
            debug!("Removed temp audio: {}", audio_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Delete every `.wav` directly inside the scratch directory.
///
/// A missing directory means nothing to sweep. Returns how many files were
/// removed; failing to delete an existing file propagates.
pub async fn sweep_temp_audio(temp_audio_dir: &Path) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(temp_audio_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut cleaned = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case("wav") {
                tokio::fs::remove_file(&path).await?;
                cleaned += 1;
            }
        }
    }

    if cleaned > 0 {
        info!(
            "🧹 Cleaned up {} temporary audio {}",
            cleaned,
            pluralize(cleaned, "file", "files")
        );
    }
    Ok(cleaned)
}

/// Recursively delete stale download staging files (`*.tmp`) left anywhere
/// under the project root by an interrupted model download.
pub async fn sweep_download_remnants(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut cleaned = 0;
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("tmp") {
            tokio::fs::remove_file(path).await?;
            cleaned += 1;
        }
    }

    if cleaned > 0 {
        info!(
            "🧹 Removed {} stale download {}",
            cleaned,
            pluralize(cleaned, "remnant", "remnants")
        );
    }
    Ok(cleaned)
}
