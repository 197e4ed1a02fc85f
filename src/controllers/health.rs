use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::infrastructure::storage::Storage;

/// GET /health - Report which working directories exist
pub async fn health(State(storage): State<Arc<Storage>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "directories": storage.directory_status(),
    }))
}
