use super::cloned_voice::ClonedVoiceSynthesizer;
use super::error::AudiobookError;
use super::model::{
    preview_of, GenerateRequest, JobStage, OutputFormat, PublishedAudiobook, TextPreview,
    VoiceType,
};
use crate::infrastructure::audio::merge_wav_chunks;
use crate::infrastructure::repositories::{
    PdfTextRepository, SpeechRepository, TranscodeRepository, VoiceCloneRepository,
};
use crate::infrastructure::storage::{move_file, remove_file_quietly, JobWorkspace, Storage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Tunables shared by every job.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub preview_chars: usize,
    pub default_chunk_size: usize,
    pub chunk_pause: Duration,
}

/// A `/tts` request that passed validation.
#[derive(Debug)]
struct ValidatedJob {
    voice_type: VoiceType,
    format: OutputFormat,
    text_file: PathBuf,
    chunk_size: usize,
    voice_sample: Option<Vec<u8>>,
    keep_voice: bool,
}

#[derive(Clone)]
pub struct AudiobookService {
    storage: Arc<Storage>,
    pdf_repo: Arc<dyn PdfTextRepository>,
    speech_repo: Arc<dyn SpeechRepository>,
    cloned_voice: ClonedVoiceSynthesizer,
    transcode_repo: Arc<dyn TranscodeRepository>,
    settings: PipelineSettings,
}

impl AudiobookService {
    pub fn new(
        storage: Arc<Storage>,
        pdf_repo: Arc<dyn PdfTextRepository>,
        speech_repo: Arc<dyn SpeechRepository>,
        clone_repo: Arc<dyn VoiceCloneRepository>,
        transcode_repo: Arc<dyn TranscodeRepository>,
        settings: PipelineSettings,
    ) -> Self {
        let cloned_voice = ClonedVoiceSynthesizer::new(clone_repo, settings.chunk_pause);
        Self {
            storage,
            pdf_repo,
            speech_repo,
            cloned_voice,
            transcode_repo,
            settings,
        }
    }
}

#[async_trait]
pub trait AudiobookServiceApi: Send + Sync {
    /// Extract the text of an uploaded PDF into a text handle and return a
    /// bounded preview of it.
    async fn extract_preview(&self, pdf: Vec<u8>) -> Result<TextPreview, AudiobookError>;

    /// Run the generation pipeline for a previously extracted text handle.
    ///
    /// This operation:
    /// - Validates voice type, format, text handle and voice sample
    /// - Synthesizes (single call for `ai`, chunk + merge for `myvoice`)
    /// - Transcodes when the requested format is not WAV
    /// - Publishes the result under `/audio/`
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<PublishedAudiobook, AudiobookError>;
}

#[async_trait]
impl AudiobookServiceApi for AudiobookService {
    async fn extract_preview(&self, pdf: Vec<u8>) -> Result<TextPreview, AudiobookError> {
        tracing::info!(upload_size = pdf.len(), "PDF preview request");

        // Removed when dropped at the end of this call
        let temp_pdf = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        tokio::fs::write(temp_pdf.path(), &pdf).await?;

        let text_path = self.storage.new_text_path();
        self.pdf_repo
            .extract_to_file(temp_pdf.path(), &text_path)
            .await
            .map_err(|e| AudiobookError::Pipeline(format!("PDF extraction failed: {e}")))?;

        let content = tokio::fs::read_to_string(&text_path).await?;
        let text_preview = preview_of(&content, self.settings.preview_chars);

        tracing::info!(
            text_file = %text_path.display(),
            characters = content.chars().count(),
            "PDF text extracted"
        );

        Ok(TextPreview {
            text_preview,
            text_file: text_path.display().to_string(),
        })
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<PublishedAudiobook, AudiobookError> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("tts_job", job_id = %job_id);

        // Runs on its own task: a client disconnect must not cancel the job
        // or its cleanup.
        let service = self.clone();
        tokio::spawn(async move { service.run_job(job_id, request).await }.instrument(span))
            .await
            .map_err(|e| AudiobookError::Pipeline(format!("job task failed: {e}")))?
    }
}

impl AudiobookService {
    async fn run_job(
        &self,
        job_id: Uuid,
        request: GenerateRequest,
    ) -> Result<PublishedAudiobook, AudiobookError> {
        let start = Instant::now();
        log_stage(JobStage::Received);

        log_stage(JobStage::Validating);
        let job = match self.validate(request).await {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(stage = %JobStage::Failed, error = %e, "Job rejected");
                return Err(e);
            }
        };
        tracing::info!(
            voice_type = %job.voice_type,
            format = %job.format,
            text_file = %job.text_file.display(),
            "Job validated"
        );

        let mut sample_path = None;
        let result = self.run_pipeline(job_id, &job, &mut sample_path).await;

        // The text handle and the voice sample are consumed once the
        // pipeline has started, whatever its outcome.
        remove_file_quietly(&job.text_file).await;
        if let Some(path) = &sample_path {
            if job.keep_voice {
                tracing::info!(path = %path.display(), "Voice sample retained");
            } else {
                remove_file_quietly(path).await;
            }
        }

        match &result {
            Ok(published) => tracing::info!(
                stage = %JobStage::Published,
                url = %published.url,
                latency_secs = start.elapsed().as_secs_f64(),
                "Audiobook published"
            ),
            Err(e) => tracing::error!(
                stage = %JobStage::Failed,
                error = %e,
                latency_secs = start.elapsed().as_secs_f64(),
                "Audiobook generation failed"
            ),
        }

        result
    }

    async fn validate(&self, request: GenerateRequest) -> Result<ValidatedJob, AudiobookError> {
        let voice_type: VoiceType = request
            .voice_type
            .parse()
            .map_err(AudiobookError::InvalidInput)?;
        let format: OutputFormat = request.format.parse().map_err(AudiobookError::InvalidInput)?;

        let text_file = self.storage.resolve_text_file(&request.text_file).await?;

        let voice_sample = match voice_type {
            VoiceType::MyVoice => match request.voice_sample {
                Some(bytes) if !bytes.is_empty() => Some(bytes),
                _ => {
                    return Err(AudiobookError::InvalidInput(
                        "Voice sample required for myvoice".to_string(),
                    ))
                }
            },
            VoiceType::Ai => None,
        };

        let chunk_size = match request.chunk_size.as_deref().map(str::trim) {
            None | Some("") => self.settings.default_chunk_size,
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AudiobookError::InvalidInput(
                        "chunk_size must be a positive integer".to_string(),
                    ))
                }
            },
        };

        Ok(ValidatedJob {
            voice_type,
            format,
            text_file,
            chunk_size,
            voice_sample,
            keep_voice: request.keep_voice,
        })
    }

    async fn run_pipeline(
        &self,
        job_id: Uuid,
        job: &ValidatedJob,
        sample_path: &mut Option<PathBuf>,
    ) -> Result<PublishedAudiobook, AudiobookError> {
        let workspace = self.storage.job_workspace(job_id).await?;

        log_stage(JobStage::Synthesizing);
        let native = match job.voice_type {
            VoiceType::Ai => self.synthesize_ai(job, &workspace).await?,
            VoiceType::MyVoice => {
                let path = self.storage.voice_sample_path(job_id);
                // Registered before writing so a partial write is still removed
                *sample_path = Some(path.clone());
                if let Some(bytes) = &job.voice_sample {
                    tokio::fs::write(&path, bytes).await?;
                    tracing::info!(path = %path.display(), "Voice sample saved");
                }
                self.synthesize_cloned(job, &path, &workspace).await?
            }
        };

        let file_name = Storage::published_name(job_id, job.format.extension());
        let destination = self.storage.published_path(&file_name);

        if job.format.needs_transcode() {
            log_stage(JobStage::Transcoding);
            if let Err(e) = self.transcode_repo.transcode(&native, &destination).await {
                remove_file_quietly(&destination).await;
                return Err(AudiobookError::Pipeline(format!("Transcoding failed: {e}")));
            }
        } else {
            move_file(&native, &destination).await?;
        }

        Ok(PublishedAudiobook {
            url: format!("/audio/{}", urlencoding::encode(&file_name)),
        })
    }

    async fn synthesize_ai(
        &self,
        job: &ValidatedJob,
        workspace: &JobWorkspace,
    ) -> Result<PathBuf, AudiobookError> {
        let output = workspace.native_path();
        self.speech_repo
            .synthesize_file(&job.text_file, &output)
            .await
            .map_err(|e| AudiobookError::Pipeline(format!("TTS process failed: {e}")))?;
        Ok(output)
    }

    async fn synthesize_cloned(
        &self,
        job: &ValidatedJob,
        voice_sample: &Path,
        workspace: &JobWorkspace,
    ) -> Result<PathBuf, AudiobookError> {
        let report = self
            .cloned_voice
            .synthesize(
                &job.text_file,
                voice_sample,
                &workspace.chunks_dir(),
                job.chunk_size,
            )
            .await?;

        if report.succeeded() == 0 {
            return Err(AudiobookError::Pipeline(format!(
                "No audio chunks were generated ({} attempted)",
                report.total()
            )));
        }

        let merged = workspace.merged_path();
        let output = merged.clone();
        tokio::task::spawn_blocking(move || merge_wav_chunks(&report.chunks, &output))
            .await
            .map_err(|e| AudiobookError::Pipeline(format!("merge task failed: {e}")))?
            .map_err(|e| AudiobookError::Pipeline(format!("Merging audio chunks failed: {e}")))?;

        Ok(merged)
    }
}

fn log_stage(stage: JobStage) {
    tracing::info!(stage = %stage, "Job stage");
}
