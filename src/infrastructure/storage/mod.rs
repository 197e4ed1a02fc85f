//! Working directories and request-scoped artifacts.

use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

pub const BOOK_TEXTS_DIR: &str = "book_texts";
pub const AUDIO_OUTPUT_DIR: &str = "audio_output";
pub const AUDIO_CHUNKS_DIR: &str = "audio_chunks";
pub const VOICE_SAMPLES_DIR: &str = "myVoice";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Existence of each working directory, as reported by `/health`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectoryStatus {
    pub book_texts: bool,
    pub audio_output: bool,
    pub audio_chunks: bool,
    pub voice_samples: bool,
}

/// A regular file in one of the published directories.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Storage {
    book_dir: PathBuf,
    audio_dir: PathBuf,
    chunk_dir: PathBuf,
    voice_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            book_dir: data_dir.join(BOOK_TEXTS_DIR),
            audio_dir: data_dir.join(AUDIO_OUTPUT_DIR),
            chunk_dir: data_dir.join(AUDIO_CHUNKS_DIR),
            voice_dir: data_dir.join(VOICE_SAMPLES_DIR),
        }
    }

    /// Create all working directories. Safe to call repeatedly.
    pub async fn ensure_directories(&self) -> io::Result<()> {
        for dir in [
            &self.book_dir,
            &self.audio_dir,
            &self.chunk_dir,
            &self.voice_dir,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        tracing::info!(
            book_texts = %self.book_dir.display(),
            audio_output = %self.audio_dir.display(),
            audio_chunks = %self.chunk_dir.display(),
            voice_samples = %self.voice_dir.display(),
            "Working directories ready"
        );
        Ok(())
    }

    pub fn directory_status(&self) -> DirectoryStatus {
        DirectoryStatus {
            book_texts: self.book_dir.is_dir(),
            audio_output: self.audio_dir.is_dir(),
            audio_chunks: self.chunk_dir.is_dir(),
            voice_samples: self.voice_dir.is_dir(),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn voice_dir(&self) -> &Path {
        &self.voice_dir
    }

    /// Fresh path for an extracted text handle
    pub fn new_text_path(&self) -> PathBuf {
        self.book_dir
            .join(format!("{}_preview.txt", Uuid::new_v4().simple()))
    }

    pub fn voice_sample_path(&self, job_id: Uuid) -> PathBuf {
        self.voice_dir.join(format!("{}_sample.wav", job_id.simple()))
    }

    pub fn published_name(job_id: Uuid, extension: &str) -> String {
        format!("{}_audiobook.{}", job_id.simple(), extension)
    }

    pub fn published_path(&self, file_name: &str) -> PathBuf {
        self.audio_dir.join(file_name)
    }

    /// Resolve a text handle returned by the preview step.
    ///
    /// The file must exist and live inside the book text directory.
    pub async fn resolve_text_file(&self, handle: &str) -> Result<PathBuf, StorageError> {
        let candidate = PathBuf::from(handle);
        if handle.trim().is_empty() || !tokio::fs::try_exists(&candidate).await.unwrap_or(false)
        {
            return Err(StorageError::NotFound("Text file".to_string()));
        }

        let resolved = tokio::fs::canonicalize(&candidate).await?;
        let root = tokio::fs::canonicalize(&self.book_dir).await?;
        if !resolved.starts_with(&root) || !resolved.is_file() {
            return Err(StorageError::Rejected(
                "text_file must reference text extracted by /extract_pdf_preview".to_string(),
            ));
        }

        Ok(resolved)
    }

    /// Resolve a voice sample name to a path inside the voice directory.
    pub fn voice_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(name);
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.voice_dir.join(path)),
            _ => Err(StorageError::Rejected(format!(
                "invalid voice name: {name}"
            ))),
        }
    }

    pub async fn list_audiobooks(&self) -> io::Result<Vec<StoredFile>> {
        list_files(&self.audio_dir).await
    }

    pub async fn list_voices(&self) -> io::Result<Vec<StoredFile>> {
        list_files(&self.voice_dir).await
    }

    /// Create an isolated chunk workspace for one job.
    pub async fn job_workspace(&self, job_id: Uuid) -> io::Result<JobWorkspace> {
        let path = self.chunk_dir.join(job_id.simple().to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(JobWorkspace { path })
    }
}

/// Per-job scratch directory under `audio_chunks/`, removed on drop.
#[derive(Debug)]
pub struct JobWorkspace {
    path: PathBuf,
}

impl JobWorkspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.path.join("chunks")
    }

    pub fn merged_path(&self) -> PathBuf {
        self.path.join("merged.wav")
    }

    pub fn native_path(&self) -> PathBuf {
        self.path.join("audiobook.wav")
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove job workspace"
                );
            }
        }
    }
}

/// Remove a file, logging rather than failing when it cannot be removed.
pub async fn remove_file_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove artifact"),
    }
}

/// Move a file, falling back to copy + delete across filesystems.
pub async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await
}

async fn list_files(dir: &Path) -> io::Result<Vec<StoredFile>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        files.push(StoredFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
