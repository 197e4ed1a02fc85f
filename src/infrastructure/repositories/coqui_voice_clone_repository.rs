use super::speech_repository::{VoiceCloneRepository, VoiceCloneSession};
use super::RepositoryError;
use crate::infrastructure::process::{CommandSpec, ProcessRunner, WorkerProcess};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tokio::sync::Mutex;

/// Python program that keeps one Coqui TTS model in memory and serves
/// chunk requests as JSON lines.
const WORKER_SCRIPT: &str = include_str!("../../../assets/coqui_clone_worker.py");

/// Voice cloning through a long-lived Coqui TTS worker process.
///
/// `load` starts the worker and waits until the model is in memory; every
/// chunk of the job then goes to that same process.
pub struct CoquiVoiceCloneRepository {
    runner: ProcessRunner,
    program: String,
    script: String,
    model: String,
    language: String,
}

impl CoquiVoiceCloneRepository {
    pub fn new(runner: ProcessRunner, program: String, model: String, language: String) -> Self {
        Self {
            runner,
            program,
            script: WORKER_SCRIPT.to_string(),
            model,
            language,
        }
    }

    fn worker_command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(["-u", "-c", self.script.as_str()])
            .args([self.model.as_str(), self.language.as_str()])
    }
}

#[derive(Debug, Serialize)]
struct ChunkRequest<'a> {
    text: &'a str,
    speaker_wav: &'a Path,
    out_path: &'a Path,
}

#[derive(Debug, Default, Deserialize)]
struct WorkerReply {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    ok: bool,
    error: Option<String>,
}

/// Read lines until one parses as a reply; anything else is worker chatter.
async fn next_reply(worker: &mut WorkerProcess) -> Result<WorkerReply, RepositoryError> {
    loop {
        let line = worker.read_line().await?;
        match serde_json::from_str::<WorkerReply>(&line) {
            Ok(reply) => return Ok(reply),
            Err(_) => tracing::debug!(program = %worker.program(), "{line}"),
        }
    }
}

#[async_trait]
impl VoiceCloneRepository for CoquiVoiceCloneRepository {
    async fn load(&self) -> Result<Box<dyn VoiceCloneSession>, RepositoryError> {
        tracing::info!(model = %self.model, "Loading voice cloning model");
        let start = Instant::now();

        let mut worker = self.runner.spawn_worker(&self.worker_command())?;
        let reply = next_reply(&mut worker).await?;
        if !reply.ready {
            return Err(RepositoryError::Engine(reply.error.unwrap_or_else(|| {
                "worker did not report the model as loaded".to_string()
            })));
        }

        tracing::info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis(),
            "Voice cloning model loaded"
        );

        Ok(Box::new(CoquiSession {
            worker: Mutex::new(worker),
        }))
    }
}

struct CoquiSession {
    worker: Mutex<WorkerProcess>,
}

#[async_trait]
impl VoiceCloneSession for CoquiSession {
    async fn synthesize_chunk(
        &self,
        text: &str,
        voice_sample: &Path,
        output: &Path,
    ) -> Result<(), RepositoryError> {
        let request = serde_json::to_string(&ChunkRequest {
            text,
            speaker_wav: voice_sample,
            out_path: output,
        })
        .map_err(|e| RepositoryError::Engine(format!("cannot encode chunk request: {e}")))?;

        let mut worker = self.worker.lock().await;
        worker.send_line(&request).await?;
        let reply = next_reply(&mut worker).await?;

        if reply.ok {
            Ok(())
        } else {
            Err(RepositoryError::Engine(
                reply.error.unwrap_or_else(|| "unknown worker error".to_string()),
            ))
        }
    }
}
