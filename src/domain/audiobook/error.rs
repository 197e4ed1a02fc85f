use crate::error::AppError;
use crate::infrastructure::repositories::RepositoryError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AudiobookError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Pipeline(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<RepositoryError> for AudiobookError {
    fn from(err: RepositoryError) -> Self {
        AudiobookError::Pipeline(err.to_string())
    }
}

impl From<StorageError> for AudiobookError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AudiobookError::NotFound(format!("{what} not found")),
            StorageError::Rejected(msg) => AudiobookError::InvalidInput(msg),
            StorageError::Io(e) => AudiobookError::Io(e),
        }
    }
}

impl From<AudiobookError> for AppError {
    fn from(err: AudiobookError) -> Self {
        match err {
            AudiobookError::InvalidInput(msg) => AppError::BadRequest(msg),
            AudiobookError::NotFound(msg) => AppError::NotFound(msg),
            AudiobookError::Pipeline(msg) => AppError::Pipeline(msg),
            AudiobookError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
