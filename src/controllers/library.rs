use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    domain::library::{AudiobookEntry, LibraryService, LibraryServiceApi, VoiceEntry},
    error::AppResult,
};

#[derive(Debug, Serialize)]
pub struct AudiobookListResponse {
    pub audiobooks: Vec<AudiobookEntry>,
}

#[derive(Debug, Serialize)]
pub struct VoiceListResponse {
    pub voices: Vec<VoiceEntry>,
}

pub struct LibraryController {
    library_service: Arc<LibraryService>,
}

impl LibraryController {
    pub fn new(library_service: Arc<LibraryService>) -> Self {
        Self { library_service }
    }

    /// GET /list_audiobooks - List generated audiobooks
    pub async fn list_audiobooks(
        State(controller): State<Arc<LibraryController>>,
    ) -> AppResult<Json<AudiobookListResponse>> {
        let audiobooks = controller.library_service.list_audiobooks().await?;
        Ok(Json(AudiobookListResponse { audiobooks }))
    }

    /// GET /voices - List stored voice samples
    pub async fn list_voices(
        State(controller): State<Arc<LibraryController>>,
    ) -> AppResult<Json<VoiceListResponse>> {
        let voices = controller.library_service.list_voices().await?;
        Ok(Json(VoiceListResponse { voices }))
    }

    /// DELETE /voices/{voice_name} - Delete a stored voice sample
    pub async fn delete_voice(
        State(controller): State<Arc<LibraryController>>,
        Path(voice_name): Path<String>,
    ) -> AppResult<Json<Value>> {
        controller.library_service.delete_voice(&voice_name).await?;
        Ok(Json(json!({
            "status": "deleted",
            "voice": voice_name,
        })))
    }
}
