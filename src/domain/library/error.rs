use crate::error::AppError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for LibraryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => LibraryError::NotFound(format!("{what} not found")),
            StorageError::Rejected(msg) => LibraryError::Invalid(msg),
            StorageError::Io(e) => LibraryError::Io(e),
        }
    }
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::NotFound(msg) => AppError::NotFound(msg),
            LibraryError::Invalid(msg) => AppError::BadRequest(msg),
            LibraryError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
