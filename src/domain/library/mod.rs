pub mod error;
pub mod model;
pub mod service;

pub use error::LibraryError;
pub use model::{AudiobookEntry, VoiceEntry};
pub use service::{LibraryService, LibraryServiceApi};
