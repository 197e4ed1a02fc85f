use super::error::LibraryError;
use super::model::{AudiobookEntry, VoiceEntry};
use crate::infrastructure::storage::{Storage, StorageError};
use async_trait::async_trait;
use std::sync::Arc;

/// Published audiobooks and stored voice samples.
pub struct LibraryService {
    storage: Arc<Storage>,
}

impl LibraryService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
pub trait LibraryServiceApi: Send + Sync {
    async fn list_audiobooks(&self) -> Result<Vec<AudiobookEntry>, LibraryError>;

    async fn list_voices(&self) -> Result<Vec<VoiceEntry>, LibraryError>;

    /// Delete a stored voice sample by file name.
    async fn delete_voice(&self, name: &str) -> Result<(), LibraryError>;
}

#[async_trait]
impl LibraryServiceApi for LibraryService {
    async fn list_audiobooks(&self) -> Result<Vec<AudiobookEntry>, LibraryError> {
        let files = self.storage.list_audiobooks().await?;
        Ok(files
            .into_iter()
            .map(|file| AudiobookEntry {
                url: format!("/audio/{}", urlencoding::encode(&file.name)),
                kind: file_type(&file.name),
                name: file.name,
            })
            .collect())
    }

    async fn list_voices(&self) -> Result<Vec<VoiceEntry>, LibraryError> {
        let files = self.storage.list_voices().await?;
        Ok(files
            .into_iter()
            .map(|file| VoiceEntry {
                url: format!("/voice_samples/{}", urlencoding::encode(&file.name)),
                name: file.name,
            })
            .collect())
    }

    async fn delete_voice(&self, name: &str) -> Result<(), LibraryError> {
        let path = self.storage.voice_path(name)?;
        if !path.is_file() {
            return Err(StorageError::NotFound("Voice".to_string()).into());
        }
        tokio::fs::remove_file(&path).await?;
        tracing::info!(voice = %name, "Voice sample deleted");
        Ok(())
    }
}

/// Extension after the last dot, or the whole name when there is none.
fn file_type(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_string()
}
