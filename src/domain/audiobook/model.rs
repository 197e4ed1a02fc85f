use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which synthesis path a job takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceType {
    Ai,
    MyVoice,
}

impl VoiceType {
    pub const ALL: [VoiceType; 2] = [VoiceType::Ai, VoiceType::MyVoice];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceType::Ai => "ai",
            VoiceType::MyVoice => "myvoice",
        }
    }
}

impl FromStr for VoiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Ok(VoiceType::Ai),
            "myvoice" => Ok(VoiceType::MyVoice),
            _ => Err(format!(
                "voice_type must be one of {}",
                Self::ALL.map(|v| v.as_str()).join(", ")
            )),
        }
    }
}

impl fmt::Display for VoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container of the published audiobook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp3,
    Wav,
}

impl OutputFormat {
    /// Container every synthesis path produces before transcoding
    pub const NATIVE: OutputFormat = OutputFormat::Wav;

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
        }
    }

    pub fn needs_transcode(&self) -> bool {
        *self != Self::NATIVE
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "wav" => Ok(OutputFormat::Wav),
            _ => Err("format must be mp3 or wav".to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lifecycle of a `/tts` job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Received,
    Validating,
    Synthesizing,
    Transcoding,
    Published,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Received => "received",
            JobStage::Validating => "validating",
            JobStage::Synthesizing => "synthesizing",
            JobStage::Transcoding => "transcoding",
            JobStage::Published => "published",
            JobStage::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `/tts` form input, validated by the service.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub text_file: String,
    pub voice_type: String,
    pub format: String,
    pub voice_sample: Option<Vec<u8>>,
    pub chunk_size: Option<String>,
    pub keep_voice: bool,
}

/// Word-bounded slice of the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
}

impl TextChunk {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn file_name(&self) -> String {
        format!("chunk_{}.wav", self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    Synthesized,
    Failed(String),
}

/// One synthesized (or failed) chunk, consumed in order by the merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub path: PathBuf,
    pub status: ChunkStatus,
}

impl ChunkDescriptor {
    pub fn is_synthesized(&self) -> bool {
        self.status == ChunkStatus::Synthesized
    }
}

/// Ordered outcome of cloned-voice synthesis.
#[derive(Debug, Clone, Default)]
pub struct ChunkReport {
    pub chunks: Vec<ChunkDescriptor>,
}

impl ChunkReport {
    pub fn total(&self) -> usize {
        self.chunks.len()
    }

    pub fn succeeded(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_synthesized()).count()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .filter(|c| !c.is_synthesized())
            .map(|c| c.index)
            .collect()
    }
}

/// Result of `/extract_pdf_preview`.
#[derive(Debug, Clone, Serialize)]
pub struct TextPreview {
    pub text_preview: String,
    pub text_file: String,
}

/// Result of `/tts`.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedAudiobook {
    pub url: String,
}

/// First `max_chars` characters of `content`, with an ellipsis when cut.
pub fn preview_of(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
