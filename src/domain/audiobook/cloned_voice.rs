use super::chunker::split_into_word_chunks;
use super::error::AudiobookError;
use super::model::{ChunkDescriptor, ChunkReport, ChunkStatus};
use crate::infrastructure::repositories::VoiceCloneRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Synthesizes a text file chunk by chunk in a cloned voice.
///
/// The model is loaded once per call. A chunk that fails is recorded and
/// skipped; there are no retries.
#[derive(Clone)]
pub struct ClonedVoiceSynthesizer {
    cloner: Arc<dyn VoiceCloneRepository>,
    pause: Duration,
}

impl ClonedVoiceSynthesizer {
    pub fn new(cloner: Arc<dyn VoiceCloneRepository>, pause: Duration) -> Self {
        Self { cloner, pause }
    }

    /// Write `chunk_<index>.wav` files into `output_dir` and report each
    /// chunk's outcome in split order.
    pub async fn synthesize(
        &self,
        text_file: &Path,
        voice_sample: &Path,
        output_dir: &Path,
        chunk_size: usize,
    ) -> Result<ChunkReport, AudiobookError> {
        if chunk_size == 0 {
            return Err(AudiobookError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if !tokio::fs::try_exists(text_file).await.unwrap_or(false) {
            return Err(AudiobookError::Pipeline(format!(
                "Input text file not found: {}",
                text_file.display()
            )));
        }
        if !tokio::fs::try_exists(voice_sample).await.unwrap_or(false) {
            return Err(AudiobookError::Pipeline(format!(
                "Voice file not found: {}",
                voice_sample.display()
            )));
        }
        tokio::fs::create_dir_all(output_dir).await?;

        let text = tokio::fs::read_to_string(text_file).await?;
        let chunks = split_into_word_chunks(&text, chunk_size);
        tracing::info!(chunk_count = chunks.len(), chunk_size, "Split text into chunks");

        let session = self
            .cloner
            .load()
            .await
            .map_err(|e| AudiobookError::Pipeline(format!("Failed to load TTS model: {e}")))?;

        let total = chunks.len();
        let mut report = ChunkReport::default();

        for chunk in &chunks {
            let path = output_dir.join(chunk.file_name());
            tracing::info!(
                chunk_index = chunk.index,
                progress = %format!("{}/{}", chunk.index + 1, total),
                words = chunk.word_count(),
                "Generating audio chunk"
            );

            let status = match session.synthesize_chunk(&chunk.text, voice_sample, &path).await {
                Ok(()) => {
                    tracing::info!(
                        chunk_index = chunk.index,
                        path = %path.display(),
                        "Chunk saved"
                    );
                    ChunkStatus::Synthesized
                }
                Err(e) => {
                    tracing::warn!(chunk_index = chunk.index, error = %e, "Chunk failed");
                    ChunkStatus::Failed(e.to_string())
                }
            };
            report.chunks.push(ChunkDescriptor {
                index: chunk.index,
                path,
                status,
            });

            if chunk.index + 1 < total && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        tracing::info!(
            succeeded = report.succeeded(),
            total = report.total(),
            failed = ?report.failed_indices(),
            "Finished generating chunks"
        );

        Ok(report)
    }
}
