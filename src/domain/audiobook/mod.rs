pub mod chunker;
pub mod cloned_voice;
pub mod error;
pub mod model;
pub mod service;

pub use cloned_voice::ClonedVoiceSynthesizer;
pub use error::AudiobookError;
pub use model::{GenerateRequest, OutputFormat, PublishedAudiobook, TextPreview, VoiceType};
pub use service::{AudiobookService, AudiobookServiceApi, PipelineSettings};
