use super::speech_repository::TranscodeRepository;
use super::RepositoryError;
use crate::infrastructure::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::path::Path;

/// Transcoding with the `ffmpeg` executable.
pub struct FfmpegTranscodeRepository {
    runner: ProcessRunner,
    program: String,
}

impl FfmpegTranscodeRepository {
    pub fn new(runner: ProcessRunner, program: String) -> Self {
        Self { runner, program }
    }

    fn command(&self, input: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .arg(output)
    }
}

#[async_trait]
impl TranscodeRepository for FfmpegTranscodeRepository {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), RepositoryError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(RepositoryError::MissingInput(input.display().to_string()));
        }

        let result = self.runner.run(&self.command(input, output)).await?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            latency_ms = result.elapsed.as_millis(),
            "Transcoding complete"
        );

        Ok(())
    }
}
