use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub log_dir: PathBuf,
    /// Parent of the four working directories
    pub data_dir: PathBuf,
    // Pipeline
    pub preview_chars: usize,
    pub chunk_size: usize,
    pub chunk_pause_ms: u64,
    pub max_upload_bytes: usize,
    pub process_timeout_secs: u64,
    // Generic voice (espeak-ng)
    pub espeak_bin: String,
    pub ai_voice: String,
    pub ai_speech_rate: u32,
    // Cloned voice (Python interpreter running the Coqui TTS worker)
    pub clone_bin: String,
    pub clone_model: String,
    pub clone_language: String,
    // Transcoding
    pub ffmpeg_bin: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults; present but unparsable numeric
    /// values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse()?,
            environment: match var("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            log_dir: PathBuf::from(var("LOG_DIR", "logs")),
            data_dir: PathBuf::from(var("DATA_DIR", ".")),
            preview_chars: var("PREVIEW_CHARS", "2000").parse()?,
            chunk_size: var("CHUNK_SIZE", "400").parse()?,
            chunk_pause_ms: var("CHUNK_PAUSE_MS", "500").parse()?,
            max_upload_bytes: var("MAX_UPLOAD_BYTES", "104857600").parse()?,
            process_timeout_secs: var("PROCESS_TIMEOUT_SECS", "3600").parse()?,
            espeak_bin: var("ESPEAK_BIN", "espeak-ng"),
            ai_voice: var("AI_VOICE", "en"),
            ai_speech_rate: var("AI_SPEECH_RATE", "150").parse()?,
            clone_bin: var("CLONE_BIN", "python3"),
            clone_model: var(
                "CLONE_MODEL",
                "tts_models/multilingual/multi-dataset/your_tts",
            ),
            clone_language: var("CLONE_LANGUAGE", "en"),
            ffmpeg_bin: var("FFMPEG_BIN", "ffmpeg"),
        };

        if config.chunk_size == 0 {
            return Err("CHUNK_SIZE must be greater than zero".into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn chunk_pause(&self) -> Duration {
        Duration::from_millis(self.chunk_pause_ms)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }
}
