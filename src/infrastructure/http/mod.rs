use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    controllers::{audiobook::AudiobookController, health, library::LibraryController, pages},
    infrastructure::{config::Config, storage::Storage},
};

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router with every route and layer attached
pub fn create_app(
    storage: Arc<Storage>,
    audiobook_controller: Arc<AudiobookController>,
    library_controller: Arc<LibraryController>,
    max_upload_bytes: usize,
) -> Router {
    // Pipeline routes (multipart uploads)
    let audiobook_routes = Router::new()
        .route(
            "/extract_pdf_preview",
            post(AudiobookController::extract_pdf_preview),
        )
        .route("/tts", post(AudiobookController::tts))
        .with_state(audiobook_controller)
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    // Library routes
    let library_routes = Router::new()
        .route("/list_audiobooks", get(LibraryController::list_audiobooks))
        .route("/voices", get(LibraryController::list_voices))
        .route("/voices/:voice_name", delete(LibraryController::delete_voice))
        .with_state(library_controller);

    // Generated audio and stored voice samples
    let static_routes = Router::new()
        .nest_service("/audio", ServeDir::new(storage.audio_dir()))
        .nest_service("/voice_samples", ServeDir::new(storage.voice_dir()));

    Router::new()
        .route("/", get(pages::home))
        .route("/health", get(health::health))
        .with_state(storage)
        .merge(audiobook_routes)
        .merge(library_routes)
        .merge(static_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve the application
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
