use std::sync::Arc;

use pdf_audiobook::controllers::{audiobook::AudiobookController, library::LibraryController};
use pdf_audiobook::domain::audiobook::{AudiobookService, PipelineSettings};
use pdf_audiobook::domain::library::LibraryService;
use pdf_audiobook::infrastructure::config::Config;
use pdf_audiobook::infrastructure::http::{create_app, start_http_server};
use pdf_audiobook::infrastructure::logging::init_logging;
use pdf_audiobook::infrastructure::process::ProcessRunner;
use pdf_audiobook::infrastructure::repositories::{
    CoquiVoiceCloneRepository, EspeakSpeechRepository, FfmpegTranscodeRepository,
    LopdfTextRepository,
};
use pdf_audiobook::infrastructure::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = init_logging(&config)?;

    tracing::info!(
        "Starting PDF audiobook server on {}:{}",
        config.host,
        config.port
    );

    // Working directories
    let storage = Arc::new(Storage::new(&config.data_dir));
    storage.ensure_directories().await?;

    let config = Arc::new(config);
    let runner = ProcessRunner::new(config.process_timeout());

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (external engines)
    tracing::info!("Instantiating repositories...");
    let pdf_repo = Arc::new(LopdfTextRepository::new());
    let speech_repo = Arc::new(EspeakSpeechRepository::new(
        runner.clone(),
        config.espeak_bin.clone(),
        config.ai_voice.clone(),
        config.ai_speech_rate,
    ));
    let clone_repo = Arc::new(CoquiVoiceCloneRepository::new(
        runner.clone(),
        config.clone_bin.clone(),
        config.clone_model.clone(),
        config.clone_language.clone(),
    ));
    let transcode_repo = Arc::new(FfmpegTranscodeRepository::new(
        runner,
        config.ffmpeg_bin.clone(),
    ));

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let audiobook_service = Arc::new(AudiobookService::new(
        storage.clone(),
        pdf_repo,
        speech_repo,
        clone_repo,
        transcode_repo,
        PipelineSettings {
            preview_chars: config.preview_chars,
            default_chunk_size: config.chunk_size,
            chunk_pause: config.chunk_pause(),
        },
    ));
    let library_service = Arc::new(LibraryService::new(storage.clone()));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let audiobook_controller = Arc::new(AudiobookController::new(audiobook_service));
    let library_controller = Arc::new(LibraryController::new(library_service));

    let app = create_app(
        storage,
        audiobook_controller,
        library_controller,
        config.max_upload_bytes,
    );

    start_http_server(config, app).await?;

    Ok(())
}
