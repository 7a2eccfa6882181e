use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::task;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{ModelKind, ModelStore, Result, TranscriptionError};
use crate::config::TranscriptionConfig;
use crate::progress::Spinner;

/// Sample rate whisper.cpp expects; audio extraction is pinned to the same.
const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decoded text for one audio file.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Trimmed transcript text
    pub text: String,

    /// Wall time the decode took
    pub elapsed: Duration,
}

/// Owns the loaded Whisper context together with the decode configuration.
///
/// The batch runner is the engine's single owner: the context loads lazily on
/// the first transcription, stays cached for the rest of the run, and is freed
/// by `release` (or by dropping the engine on interrupt paths).
pub struct TranscriptionEngine {
    config: TranscriptionConfig,
    store: ModelStore,
    model: ModelKind,
    context: Option<WhisperContext>,
}

impl TranscriptionEngine {
    pub fn new(config: TranscriptionConfig, models_dir: PathBuf) -> Result<Self> {
        // Route whisper.cpp/ggml output into tracing instead of raw stderr
        whisper_rs::install_logging_hooks();

        let model = config
            .model
            .parse::<ModelKind>()
            .map_err(TranscriptionError::Configuration)?;

        Ok(Self {
            config,
            store: ModelStore::new(models_dir),
            model,
            context: None,
        })
    }

    /// Load the model context if it is not resident yet.
    ///
    /// Fetches the weights on first use. A spinner repaints the status line
    /// while the context initializes and is cleared on success and error
    /// alike.
    pub async fn load(&mut self) -> Result<()> {
        if self.context.is_some() {
            return Ok(());
        }

        let model_path = self.store.ensure_available(self.model).await?;

        let spinner = Spinner::start("🤖 Loading model...");
        let mut params = WhisperContextParameters::default();
        params.use_gpu(self.config.use_gpu);

        // Context creation is synchronous and heavy; run it off the async thread
        let model_path_str = model_path.to_string_lossy().to_string();
        let context =
            task::spawn_blocking(move || WhisperContext::new_with_params(&model_path_str, params))
                .await
                .map_err(|e| TranscriptionError::ModelLoad(format!("Task join error: {}", e)))?
                .map_err(|e| TranscriptionError::ModelLoad(e.to_string()))?;

        spinner.finish();
        println!("✅ Model loaded\n");
        self.context = Some(context);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.context.is_some()
    }

    /// Drop the cached context, freeing model memory. Idempotent.
    pub fn release(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("Model context released");
        }
    }

    /// Transcribe one extracted WAV file, loading the model if needed.
    pub async fn transcribe_file(&mut self, audio_path: &Path) -> Result<Transcript> {
        self.load().await?;

        let context = self.context.take().ok_or_else(|| {
            TranscriptionError::ModelLoad("context missing after load".to_string())
        })?;
        let config = self.config.clone();
        let path = audio_path.to_path_buf();

        let started = Instant::now();
        // The context moves into the blocking task and back out so the decode
        // does not stall the runtime thread
        let (context, result) = task::spawn_blocking(move || {
            let result = decode_file(&context, &config, &path);
            (context, result)
        })
        .await
        .map_err(|e| TranscriptionError::Whisper(format!("Task join error: {}", e)))?;

        self.context = Some(context);
        let text = result?;

        Ok(Transcript {
            text,
            elapsed: started.elapsed(),
        })
    }

    /// Write transcript text as `<base>.txt`, overwriting any previous version.
    pub async fn save_transcript(
        &self,
        transcripts_dir: &Path,
        base_name: &str,
        text: &str,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(transcripts_dir).await?;
        let path = transcripts_dir.join(format!("{}.txt", base_name));
        tokio::fs::write(&path, text).await?;
        println!("💾 Transcript saved: {}", path.display());
        Ok(path)
    }
}

/// Run one full decode pass over the samples in `audio_path`.
fn decode_file(
    context: &WhisperContext,
    config: &TranscriptionConfig,
    audio_path: &Path,
) -> Result<String> {
    let samples = read_wav_samples(audio_path)?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(config.language.as_deref());
    params.set_n_threads(config.threads as i32);
    params.set_temperature(config.temperature);
    params.set_temperature_inc(config.temperature_increment);
    params.set_no_speech_thold(config.no_speech_threshold);
    params.set_logprob_thold(config.logprob_threshold);
    params.set_entropy_thold(config.entropy_threshold);
    params.set_no_context(!config.condition_on_previous_text);
    params.set_suppress_blank(config.suppress_blank);
    params.set_max_initial_ts(config.max_initial_timestamp);
    params.set_token_timestamps(config.word_timestamps);
    params.set_print_timestamps(false); // Disable whisper.cpp's internal timestamp printing
    params.set_print_progress(false); // Disable progress output
    params.set_print_special(false); // Disable special token printing
    params.set_print_realtime(false); // Disable real-time printing

    let mut state = context
        .create_state()
        .map_err(|e| TranscriptionError::Whisper(format!("Failed to create state: {}", e)))?;

    state
        .full(params, &samples)
        .map_err(|e| TranscriptionError::Whisper(format!("Decoding failed: {}", e)))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| TranscriptionError::Whisper(format!("Failed to get segment count: {}", e)))?;

    let mut full_text = String::new();
    for i in 0..num_segments {
        let text = state.full_get_segment_text(i).map_err(|e| {
            TranscriptionError::Whisper(format!("Failed to get segment text: {}", e))
        })?;
        full_text.push_str(&text);
    }

    Ok(full_text.trim().to_string())
}

/// Read a mono 16 kHz PCM WAV into normalized f32 samples.
fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| {
        TranscriptionError::Audio(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(TranscriptionError::Audio(format!(
            "expected mono audio, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate != WHISPER_SAMPLE_RATE {
        return Err(TranscriptionError::Audio(format!(
            "expected {} Hz audio, got {} Hz",
            WHISPER_SAMPLE_RATE, spec.sample_rate
        )));
    }

    reader
        .samples::<i16>()
        .map(|s| s.map(|sample| sample as f32 / i16::MAX as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| TranscriptionError::Audio(format!("Failed to read samples: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn test_config() -> TranscriptionConfig {
        Config::default().transcription
    }

    fn write_test_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_engine_rejects_unknown_model() {
        let mut config = test_config();
        config.model = "gigantic".to_string();
        let result = TranscriptionEngine::new(config, PathBuf::from("models"));
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_release_is_idempotent() {
        let mut engine = TranscriptionEngine::new(test_config(), PathBuf::from("models")).unwrap();
        assert!(!engine.is_loaded());
        engine.release();
        engine.release();
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_read_wav_samples_normalizes() {
        let temp_dir = TempDir::new().unwrap();
        let wav_path = temp_dir.path().join("tone.wav");
        write_test_wav(&wav_path, 16_000, 1, &[0, i16::MAX, i16::MIN + 1]);

        let samples = read_wav_samples(&wav_path).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 1.0).abs() < 1e-6);
        assert!((samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_read_wav_samples_rejects_wrong_format() {
        let temp_dir = TempDir::new().unwrap();

        let stereo = temp_dir.path().join("stereo.wav");
        write_test_wav(&stereo, 16_000, 2, &[0, 0]);
        assert!(read_wav_samples(&stereo).is_err());

        let slow = temp_dir.path().join("slow.wav");
        write_test_wav(&slow, 8_000, 1, &[0]);
        assert!(read_wav_samples(&slow).is_err());
    }

    #[tokio::test]
    async fn test_save_transcript_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let engine = TranscriptionEngine::new(test_config(), PathBuf::from("models")).unwrap();

        engine
            .save_transcript(temp_dir.path(), "lecture", "first pass")
            .await
            .unwrap();
        let path = engine
            .save_transcript(temp_dir.path(), "lecture", "second pass")
            .await
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "second pass");
    }
}
