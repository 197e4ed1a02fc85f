use super::RepositoryError;
use async_trait::async_trait;
use std::path::Path;

/// Generic text-to-speech engine.
///
/// Implementations synthesize the whole text file in one call, with a fixed
/// voice and speech rate, into a single WAV file.
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// # Errors
    /// Returns error if the input file is missing or the engine fails
    async fn synthesize_file(&self, text_file: &Path, output: &Path) -> Result<(), RepositoryError>;
}

/// Voice-cloning text-to-speech engine.
#[async_trait]
pub trait VoiceCloneRepository: Send + Sync {
    /// Load the cloning model. Called once per job, before any chunk.
    async fn load(&self) -> Result<Box<dyn VoiceCloneSession>, RepositoryError>;
}

/// A loaded cloning model.
#[async_trait]
pub trait VoiceCloneSession: Send + Sync {
    /// Synthesize `text` in the timbre of `voice_sample`, writing WAV to `output`.
    async fn synthesize_chunk(
        &self,
        text: &str,
        voice_sample: &Path,
        output: &Path,
    ) -> Result<(), RepositoryError>;
}

/// Audio container conversion. The target container follows the output
/// file's extension.
#[async_trait]
pub trait TranscodeRepository: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), RepositoryError>;
}
