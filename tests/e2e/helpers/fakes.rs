use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use pdf_audiobook::infrastructure::repositories::{
    RepositoryError, SpeechRepository, TranscodeRepository, VoiceCloneRepository,
    VoiceCloneSession,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SAMPLE_RATE: u32 = 8000;

/// Frames written per word; fake speech runs at 150 words per minute
pub const FRAMES_PER_WORD: u32 = SAMPLE_RATE * 60 / 150;

/// Write a mono 16-bit WAV whose length is proportional to the word count.
fn write_speech(output: &Path, words: usize) -> Result<(), RepositoryError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output, spec)?;
    for frame in 0..(words as u32 * FRAMES_PER_WORD) {
        writer.write_sample(((frame % 64) as i16 - 32) * 100)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Generic voice that speaks the whole file in one call.
#[derive(Default)]
pub struct FakeSpeechRepository {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl SpeechRepository for FakeSpeechRepository {
    async fn synthesize_file(
        &self,
        text_file: &Path,
        output: &Path,
    ) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Audio("speech engine crashed".to_string()));
        }
        let text = tokio::fs::read_to_string(text_file).await?;
        write_speech(output, text.split_whitespace().count())
    }
}

/// Cloning engine that records every chunk it is asked to speak.
#[derive(Default)]
pub struct FakeVoiceCloneRepository {
    pub loads: AtomicUsize,
    pub chunks: Arc<Mutex<Vec<String>>>,
    pub fail_on: Arc<Mutex<Vec<usize>>>,
    pub chunk_delay_ms: AtomicU64,
}

impl FakeVoiceCloneRepository {
    /// Make every chunk take at least `delay` to synthesize
    pub fn slow_chunks(&self, delay: Duration) {
        self.chunk_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_chunks(&self, indices: &[usize]) {
        *self.fail_on.lock().unwrap() = indices.to_vec();
    }

    pub fn chunk_texts(&self) -> Vec<String> {
        self.chunks.lock().unwrap().clone()
    }
}

struct FakeCloneSession {
    chunks: Arc<Mutex<Vec<String>>>,
    fail_on: Vec<usize>,
    delay: Duration,
}

#[async_trait]
impl VoiceCloneRepository for FakeVoiceCloneRepository {
    async fn load(&self) -> Result<Box<dyn VoiceCloneSession>, RepositoryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeCloneSession {
            chunks: self.chunks.clone(),
            fail_on: self.fail_on.lock().unwrap().clone(),
            delay: Duration::from_millis(self.chunk_delay_ms.load(Ordering::SeqCst)),
        }))
    }
}

#[async_trait]
impl VoiceCloneSession for FakeCloneSession {
    async fn synthesize_chunk(
        &self,
        text: &str,
        voice_sample: &Path,
        output: &Path,
    ) -> Result<(), RepositoryError> {
        if !voice_sample.is_file() {
            return Err(RepositoryError::MissingInput(voice_sample.display().to_string()));
        }
        let index = {
            let mut chunks = self.chunks.lock().unwrap();
            chunks.push(text.to_string());
            chunks.len() - 1
        };
        tokio::time::sleep(self.delay).await;
        if self.fail_on.contains(&index) {
            return Err(RepositoryError::Audio(format!("chunk {index} ran out of memory")));
        }
        write_speech(output, text.split_whitespace().count())
    }
}

/// Transcoder that copies bytes unchanged.
#[derive(Default)]
pub struct FakeTranscodeRepository {
    pub calls: AtomicUsize,
}

#[async_trait]
impl TranscodeRepository for FakeTranscodeRepository {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}
