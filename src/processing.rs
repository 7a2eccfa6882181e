use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::error;

use crate::audio::AudioExtractor;
use crate::cleanup;
use crate::config::Config;
use crate::menu::{self, Selection};
use crate::report;
use crate::transcription::TranscriptionEngine;
use crate::video::{self, VideoScanner};

/// What a run amounted to once the controller returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Videos the pipeline was started for.
    pub attempted: usize,
    /// Transcript files confirmed on disk for the selected videos.
    pub confirmed: usize,
    /// The operator backed out instead of choosing a subset.
    pub cancelled: bool,
}

impl RunOutcome {
    fn nothing(cancelled: bool) -> Self {
        Self {
            attempted: 0,
            confirmed: 0,
            cancelled,
        }
    }

    /// Process exit status: non-zero only when videos were attempted and
    /// none of their transcripts made it to disk.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled || self.attempted == 0 || self.confirmed > 0 {
            0
        } else {
            1
        }
    }
}

/// Sequential run controller: discovery, selection, per-video pipeline,
/// final report. Owns the model handle for the lifetime of the run.
pub struct BatchRunner {
    config: Config,
    scanner: VideoScanner,
    extractor: AudioExtractor,
    engine: TranscriptionEngine,
}

impl BatchRunner {
    pub fn new(config: Config) -> Result<Self> {
        let scanner = VideoScanner::new(
            config.directories.videos_dir.clone(),
            config.directories.transcripts_dir.clone(),
        );
        let extractor = AudioExtractor::new(
            config.audio.clone(),
            config.directories.temp_audio_dir.clone(),
        );
        let engine = TranscriptionEngine::new(
            config.transcription.clone(),
            config.directories.models_dir.clone(),
        )?;

        Ok(Self {
            config,
            scanner,
            extractor,
            engine,
        })
    }

    /// Full interactive run: discover videos, ask the operator which subset
    /// to process, run the pipeline over it and report.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let videos = self.scanner.discover().await?;
        if videos.is_empty() {
            video::print_no_videos_hint(self.scanner.videos_dir());
            return Ok(RunOutcome::nothing(false));
        }

        println!(
            "\n🔍 Found {} {}",
            videos.len(),
            report::pluralize(videos.len(), "video", "videos")
        );

        let (pending, transcribed) = self.scanner.classify(&videos);
        let selection =
            menu::choose_scope_interactive(pending.clone(), transcribed.clone()).await?;
        self.execute(pending, transcribed, selection).await
    }

    /// Run the pipeline over whatever `selection` keeps from the two lists.
    ///
    /// Split out of [`run`](Self::run) so the selection can come from
    /// anywhere, not only an interactive prompt.
    pub async fn execute(
        &mut self,
        pending: Vec<String>,
        transcribed: Vec<String>,
        selection: Selection,
    ) -> Result<RunOutcome> {
        let (include_pending, include_done) = match selection {
            Selection::Proceed {
                include_pending,
                include_done,
            } => (include_pending, include_done),
            Selection::Declined => {
                println!("\n👌 Nothing to do. Until next time!");
                return Ok(RunOutcome::nothing(false));
            }
            Selection::Cancelled => {
                println!("\n🚫 Operation cancelled");
                return Ok(RunOutcome::nothing(true));
            }
        };

        let selected = selected_videos(pending, transcribed, include_pending, include_done);
        if selected.is_empty() {
            return Ok(RunOutcome::nothing(false));
        }

        let started_at = Local::now();
        let timer = Instant::now();
        let mut attempted = 0;

        for (index, name) in selected.iter().enumerate() {
            report::section_header(&format!(
                "🔄 VIDEO {}/{} - {}",
                index + 1,
                selected.len(),
                name
            ));

            attempted += 1;
            if !self.process_one(name).await? {
                error!("❌ {} failed, stopping the batch", name);
                break;
            }
        }

        let saved = self.confirmed_transcripts(&selected);
        self.print_report(started_at, Local::now(), timer.elapsed(), &saved);

        Ok(RunOutcome {
            attempted,
            confirmed: saved.len(),
            cancelled: false,
        })
    }

    /// Hand the model back before shutdown. Harmless when it never loaded.
    pub fn release_model(&mut self) {
        self.engine.release();
    }

    /// Extract, transcribe, persist. The temp audio file is removed no
    /// matter how transcription went.
    ///
    /// `Ok(false)` means extraction failed and this video produced nothing;
    /// transcription and persist failures propagate as errors.
    async fn process_one(&mut self, video_name: &str) -> Result<bool> {
        println!("\n🎵 [1/2] EXTRACTING AUDIO");
        let video_path = self.scanner.video_path(video_name);
        let audio_path = match self
            .extractor
            .extract_for_video(&video_path, video_name)
            .await?
        {
            Some(path) => path,
            None => return Ok(false),
        };
        println!("✅ Audio extracted");

        println!("\n📝 [2/2] TRANSCRIBING AUDIO");
        let outcome = self.transcribe_and_save(video_name, &audio_path).await;
        cleanup::remove_audio(&audio_path).await?;
        outcome?;

        println!("✅ Transcription completed");
        Ok(true)
    }

    async fn transcribe_and_save(&mut self, video_name: &str, audio_path: &Path) -> Result<()> {
        println!("📝 Transcribing: {}", video_name);
        let transcript = self.engine.transcribe_file(audio_path).await?;
        println!(
            "🕒 Transcription time: {}",
            report::format_duration(transcript.elapsed)
        );

        self.engine
            .save_transcript(
                &self.config.directories.transcripts_dir,
                video::base_name(video_name),
                &transcript.text,
            )
            .await?;
        Ok(())
    }

    /// Transcript files present on disk for the selected videos, checked
    /// against the filesystem rather than the per-item results so the
    /// report shows what is actually there.
    fn confirmed_transcripts(&self, selected: &[String]) -> Vec<String> {
        selected
            .iter()
            .filter(|name| self.scanner.transcript_path(name).exists())
            .map(|name| format!("{}.txt", video::base_name(name)))
            .collect()
    }

    fn print_report(
        &self,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        elapsed: Duration,
        saved: &[String],
    ) {
        report::section_header("📊 FINAL REPORT");
        println!("{}", report::format_time_range(started_at, finished_at));
        println!("🕒 Total time: {}", report::format_duration(elapsed));
        println!(
            "✅ {} {} completed",
            saved.len(),
            report::pluralize(saved.len(), "transcription", "transcriptions")
        );

        if !saved.is_empty() {
            println!(
                "\n💾 Transcripts saved to: {}/",
                self.config.directories.transcripts_dir.display()
            );
            for file in saved {
                println!("   📄 {}", file);
            }
        }
    }
}

/// Selected names keep classifier order: not-yet-transcribed first.
fn selected_videos(
    pending: Vec<String>,
    transcribed: Vec<String>,
    include_pending: bool,
    include_done: bool,
) -> Vec<String> {
    let mut selected = Vec::new();
    if include_pending {
        selected.extend(pending);
    }
    if include_done {
        selected.extend(transcribed);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner_in(dir: &TempDir) -> BatchRunner {
        let mut config = Config::default();
        config.anchor_directories(dir.path());
        BatchRunner::new(config).unwrap()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exit_codes() {
        let cancelled = RunOutcome {
            attempted: 0,
            confirmed: 0,
            cancelled: true,
        };
        assert_eq!(cancelled.exit_code(), 0);

        let idle = RunOutcome {
            attempted: 0,
            confirmed: 0,
            cancelled: false,
        };
        assert_eq!(idle.exit_code(), 0);

        let partial = RunOutcome {
            attempted: 2,
            confirmed: 1,
            cancelled: false,
        };
        assert_eq!(partial.exit_code(), 0);

        let failed = RunOutcome {
            attempted: 1,
            confirmed: 0,
            cancelled: false,
        };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_selected_videos_subsets() {
        let pending = names(&["b.mkv"]);
        let done = names(&["a.mp4"]);

        assert_eq!(
            selected_videos(pending.clone(), done.clone(), true, false),
            names(&["b.mkv"])
        );
        assert_eq!(
            selected_videos(pending.clone(), done.clone(), true, true),
            names(&["b.mkv", "a.mp4"])
        );
        assert_eq!(
            selected_videos(pending, done, false, true),
            names(&["a.mp4"])
        );
    }

    #[tokio::test]
    async fn test_execute_cancelled_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut runner = runner_in(&temp_dir);

        let outcome = runner
            .execute(names(&["b.mkv"]), names(&["a.mp4"]), Selection::Cancelled)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome {
                attempted: 0,
                confirmed: 0,
                cancelled: true,
            }
        );
        assert_eq!(outcome.exit_code(), 0);
        assert!(!temp_dir.path().join("transcripts").exists());
        assert!(!temp_dir.path().join("temp_audios").exists());
    }

    #[tokio::test]
    async fn test_execute_declined_reports_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut runner = runner_in(&temp_dir);

        let outcome = runner
            .execute(names(&["b.mkv"]), vec![], Selection::Declined)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome {
                attempted: 0,
                confirmed: 0,
                cancelled: false,
            }
        );
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_execute_stops_after_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut runner = runner_in(&temp_dir);

        // Neither video exists on disk, so extraction fails for the first
        // one and the second is never reached.
        let outcome = runner
            .execute(
                names(&["ghost.mp4", "second.mp4"]),
                vec![],
                Selection::Proceed {
                    include_pending: true,
                    include_done: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome {
                attempted: 1,
                confirmed: 0,
                cancelled: false,
            }
        );
        assert_eq!(outcome.exit_code(), 1);
        assert!(!temp_dir.path().join("transcripts").join("ghost.txt").exists());
    }

    #[test]
    fn test_confirmed_transcripts_reflect_disk() {
        let temp_dir = TempDir::new().unwrap();
        let runner = runner_in(&temp_dir);

        let transcripts_dir = temp_dir.path().join("transcripts");
        std::fs::create_dir_all(&transcripts_dir).unwrap();
        std::fs::write(transcripts_dir.join("b.txt"), "text").unwrap();

        let saved = runner.confirmed_transcripts(&names(&["a.mp4", "b.mkv"]));
        assert_eq!(saved, names(&["b.txt"]));
    }
}
