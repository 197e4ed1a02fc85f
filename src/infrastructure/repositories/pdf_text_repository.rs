use super::RepositoryError;
use async_trait::async_trait;
use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Per-run extraction statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub pages_total: usize,
    pub pages_extracted: usize,
    pub pages_skipped: usize,
    pub characters: usize,
}

/// PDF text extraction.
///
/// Pages are read in document order and joined with newlines. A page that
/// cannot be decoded is skipped; a document yielding only whitespace is a
/// failure and writes nothing.
#[async_trait]
pub trait PdfTextRepository: Send + Sync {
    async fn extract_to_file(
        &self,
        pdf: &Path,
        output: &Path,
    ) -> Result<ExtractionSummary, RepositoryError>;
}

/// Pure Rust extraction backed by `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfTextRepository;

impl LopdfTextRepository {
    pub fn new() -> Self {
        Self
    }

    fn extract_text(pdf: &Path) -> Result<(String, ExtractionSummary), RepositoryError> {
        let doc = Document::load(pdf).map_err(|e| RepositoryError::PdfOpen(e.to_string()))?;

        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(RepositoryError::PdfOpen("document is encrypted".to_string()));
        }

        let pages = doc.get_pages();
        let pages_total = pages.len();
        tracing::info!(pages_total, "Starting PDF text extraction");

        let mut text = String::new();
        let mut pages_extracted = 0;
        let mut pages_skipped = 0;

        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(page_text) => {
                    pages_extracted += 1;
                    if !page_text.is_empty() {
                        text.push_str(page_text.trim_end_matches('\n'));
                        text.push('\n');
                    }
                }
                Err(e) => {
                    pages_skipped += 1;
                    tracing::warn!(page = page_number, error = %e, "Skipping undecodable page");
                }
            }
        }

        let summary = ExtractionSummary {
            pages_total,
            pages_extracted,
            pages_skipped,
            characters: text.chars().count(),
        };
        Ok((text, summary))
    }

    fn write_atomically(output: &Path, text: &str) -> Result<(), RepositoryError> {
        let dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(text.as_bytes())?;
        temp.persist(output).map_err(|e| RepositoryError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl PdfTextRepository for LopdfTextRepository {
    #[tracing::instrument(skip_all, fields(pdf = %pdf.display()))]
    async fn extract_to_file(
        &self,
        pdf: &Path,
        output: &Path,
    ) -> Result<ExtractionSummary, RepositoryError> {
        if !tokio::fs::try_exists(pdf).await.unwrap_or(false) {
            return Err(RepositoryError::MissingInput(pdf.display().to_string()));
        }

        let start = Instant::now();
        let pdf = pdf.to_path_buf();
        let output = output.to_path_buf();

        let summary = tokio::task::spawn_blocking(move || {
            let (text, summary) = Self::extract_text(&pdf)?;
            if text.trim().is_empty() {
                return Err(RepositoryError::NoText);
            }
            Self::write_atomically(&output, &text)?;
            Ok(summary)
        })
        .await
        .map_err(|e| RepositoryError::Io(std::io::Error::other(format!("task join error: {e}"))))??;

        tracing::info!(
            pages_total = summary.pages_total,
            pages_extracted = summary.pages_extracted,
            pages_skipped = summary.pages_skipped,
            characters = summary.characters,
            latency_ms = start.elapsed().as_millis(),
            "PDF text extraction complete"
        );

        Ok(summary)
    }
}
