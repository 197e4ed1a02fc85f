pub mod coqui_voice_clone_repository;
pub mod error;
pub mod espeak_speech_repository;
pub mod ffmpeg_transcode_repository;
pub mod pdf_text_repository;
pub mod speech_repository;

pub use coqui_voice_clone_repository::CoquiVoiceCloneRepository;
pub use error::RepositoryError;
pub use espeak_speech_repository::EspeakSpeechRepository;
pub use ffmpeg_transcode_repository::FfmpegTranscodeRepository;
pub use pdf_text_repository::{ExtractionSummary, LopdfTextRepository, PdfTextRepository};
pub use speech_repository::{
    SpeechRepository, TranscodeRepository, VoiceCloneRepository, VoiceCloneSession,
};
