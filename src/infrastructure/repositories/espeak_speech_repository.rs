use super::speech_repository::SpeechRepository;
use super::RepositoryError;
use crate::infrastructure::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::path::Path;

/// Generic voice backed by the `espeak-ng` executable.
pub struct EspeakSpeechRepository {
    runner: ProcessRunner,
    program: String,
    voice: String,
    rate_wpm: u32,
}

impl EspeakSpeechRepository {
    pub fn new(runner: ProcessRunner, program: String, voice: String, rate_wpm: u32) -> Self {
        Self {
            runner,
            program,
            voice,
            rate_wpm,
        }
    }

    fn command(&self, text_file: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(["-v", self.voice.as_str()])
            .args(["-s", self.rate_wpm.to_string().as_str()])
            .arg("-f")
            .arg(text_file)
            .arg("-w")
            .arg(output)
    }
}

#[async_trait]
impl SpeechRepository for EspeakSpeechRepository {
    async fn synthesize_file(
        &self,
        text_file: &Path,
        output: &Path,
    ) -> Result<(), RepositoryError> {
        if !tokio::fs::try_exists(text_file).await.unwrap_or(false) {
            return Err(RepositoryError::MissingInput(text_file.display().to_string()));
        }

        tracing::info!(
            voice = %self.voice,
            rate_wpm = self.rate_wpm,
            text_file = %text_file.display(),
            "Starting audiobook synthesis for entire text"
        );

        let result = self.runner.run(&self.command(text_file, output)).await?;

        let elapsed = result.elapsed.as_secs();
        tracing::info!(
            provider = "espeak-ng",
            output = %output.display(),
            latency_secs = result.elapsed.as_secs_f64(),
            "Audiobook synthesized in {} min {} sec",
            elapsed / 60,
            elapsed % 60
        );

        Ok(())
    }
}
