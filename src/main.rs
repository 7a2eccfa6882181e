use anyhow::Result;
use clap::{Arg, Command};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use video_transcriber::{cleanup, setup, BatchRunner, Config, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("video-transcriber")
        .version("0.1.0")
        .about("Batch video transcription with FFmpeg and local Whisper models")
        .arg(
            Arg::new("project-dir")
                .short('d')
                .long("project-dir")
                .value_name("DIR")
                .help("Directory holding videos/, transcripts/, models/ and temp_audios/")
                .default_value("."),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("NAME")
                .help("Whisper model size (tiny, base, small, medium, large-v3)"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("CODE")
                .help("Spoken language hint, e.g. pt or en (default: auto-detect)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Logging goes to stderr so prompts, menus and the report own stdout.
    let filter = if matches.get_flag("verbose") {
        "video_transcriber=debug,info"
    } else {
        "video_transcriber=info,whisper_rs::whisper_logging_hook=warn,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let project_dir = PathBuf::from(matches.get_one::<String>("project-dir").unwrap());

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    if let Some(model) = matches.get_one::<String>("model") {
        config.transcription.model = model.clone();
    }
    if let Some(language) = matches.get_one::<String>("language") {
        config.transcription.language = Some(language.clone());
    }
    config.anchor_directories(&project_dir);
    config.validate()?;
    debug!("{}", config.summary());

    println!("🎬 VIDEO TRANSCRIPTION SYSTEM");
    println!("{}", "=".repeat(50));

    if !setup::verify_prerequisites(&config, &project_dir).await? {
        std::process::exit(1);
    }

    let outcome = run_to_completion(&config, &project_dir).await?;
    std::process::exit(outcome.exit_code());
}

/// Drive a full run, racing it against Ctrl-C. Cleanup and the farewell
/// line happen on every way out.
async fn run_to_completion(config: &Config, project_dir: &Path) -> Result<RunOutcome> {
    let mut runner = BatchRunner::new(config.clone())?;

    let outcome = tokio::select! {
        outcome = runner.run() => outcome,
        _ = tokio::signal::ctrl_c() => {
            println!("\n\n🛑 Interrupted by user");
            Ok(RunOutcome {
                attempted: 0,
                confirmed: 0,
                cancelled: true,
            })
        }
    };

    runner.release_model();
    teardown(config, project_dir).await;
    println!("\n✅ System finished\n");
    outcome
}

/// Best-effort sweeps for stray temp audio and interrupted model downloads.
/// Failures are logged, never escalated past this point.
async fn teardown(config: &Config, project_dir: &Path) {
    if let Err(e) = cleanup::sweep_temp_audio(&config.directories.temp_audio_dir).await {
        warn!("Temp audio sweep failed: {}", e);
    }
    if let Err(e) = cleanup::sweep_download_remnants(project_dir).await {
        warn!("Download remnant sweep failed: {}", e);
    }
}
