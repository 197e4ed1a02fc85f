use crate::infrastructure::process::ProcessError;

/// Failure of an external collaborator (PDF reader, TTS engine, transcoder).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    MissingInput(String),

    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    #[error("no text could be extracted from this PDF")]
    NoText,

    #[error("audio error: {0}")]
    Audio(String),

    #[error("synthesis failed: {0}")]
    Engine(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for RepositoryError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => RepositoryError::Io(e),
            other => RepositoryError::Audio(other.to_string()),
        }
    }
}
