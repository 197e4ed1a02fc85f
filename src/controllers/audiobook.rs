use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    domain::audiobook::{
        AudiobookService, AudiobookServiceApi, GenerateRequest, PublishedAudiobook, TextPreview,
    },
    error::{AppError, AppResult},
};

pub struct AudiobookController {
    audiobook_service: Arc<AudiobookService>,
}

impl AudiobookController {
    pub fn new(audiobook_service: Arc<AudiobookService>) -> Self {
        Self { audiobook_service }
    }

    /// POST /extract_pdf_preview - Extract PDF text and return a preview
    pub async fn extract_pdf_preview(
        State(controller): State<Arc<AudiobookController>>,
        mut multipart: Multipart,
    ) -> AppResult<Json<TextPreview>> {
        let mut pdf = None;
        while let Some(field) = next_field(&mut multipart).await? {
            if field.name() == Some("pdf_file") {
                pdf = Some(read_bytes(field).await?);
            }
        }

        let pdf = pdf
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| AppError::BadRequest("pdf_file is required".to_string()))?;

        let preview = controller.audiobook_service.extract_preview(pdf).await?;
        Ok(Json(preview))
    }

    /// POST /tts - Generate an audiobook from an extracted text handle
    pub async fn tts(
        State(controller): State<Arc<AudiobookController>>,
        mut multipart: Multipart,
    ) -> AppResult<Json<PublishedAudiobook>> {
        let mut request = GenerateRequest::default();
        let mut seen = Vec::new();

        while let Some(field) = next_field(&mut multipart).await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "text_file" => request.text_file = read_text(field).await?,
                "voice_type" => request.voice_type = read_text(field).await?,
                "format" => request.format = read_text(field).await?,
                "chunk_size" => request.chunk_size = Some(read_text(field).await?),
                "keep_voice" => {
                    request.keep_voice = read_text(field).await?.trim().eq_ignore_ascii_case("true")
                }
                "voice_file" => {
                    let bytes = read_bytes(field).await?;
                    // Browsers send an empty part when no file was chosen
                    request.voice_sample = (!bytes.is_empty()).then_some(bytes);
                }
                other => {
                    tracing::debug!(field = other, "Ignoring unknown form field");
                    continue;
                }
            }
            seen.push(name);
        }

        for required in ["text_file", "voice_type", "format"] {
            if !seen.iter().any(|name| name == required) {
                return Err(AppError::BadRequest(format!("{required} is required")));
            }
        }

        let published = controller.audiobook_service.generate(request).await?;
        Ok(Json(published))
    }
}

async fn next_field(multipart: &mut Multipart) -> AppResult<Option<Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| multipart_error("Failed to read form field", e))
}

async fn read_bytes(field: Field<'_>) -> AppResult<Vec<u8>> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| multipart_error("Failed to read upload", e))
}

/// Body limit overruns keep their 413; any other malformed body is a 400.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    let message = format!("{context}: {e}");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}
