use pdf_audiobook::{
    controllers::{audiobook::AudiobookController, library::LibraryController},
    domain::{
        audiobook::{AudiobookService, PipelineSettings},
        library::LibraryService,
    },
    infrastructure::{
        http::create_app,
        repositories::LopdfTextRepository,
        storage::{Storage, AUDIO_CHUNKS_DIR, BOOK_TEXTS_DIR, VOICE_SAMPLES_DIR},
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod fakes;

use api_client::{ApiResponse, MultipartForm, TestClient};
use fakes::{FakeSpeechRepository, FakeTranscodeRepository, FakeVoiceCloneRepository};

pub const DEFAULT_CHUNK_SIZE: usize = 400;

pub struct TestContext {
    pub client: TestClient,
    pub storage: Arc<Storage>,
    pub speech: Arc<FakeSpeechRepository>,
    pub cloner: Arc<FakeVoiceCloneRepository>,
    pub transcoder: Arc<FakeTranscodeRepository>,
    data_dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let data_dir = TempDir::new().expect("Failed to create data dir");
            let storage = Arc::new(Storage::new(data_dir.path()));
            storage
                .ensure_directories()
                .await
                .expect("Failed to create working directories");

            let speech = Arc::new(FakeSpeechRepository::default());
            let cloner = Arc::new(FakeVoiceCloneRepository::default());
            let transcoder = Arc::new(FakeTranscodeRepository::default());

            let audiobook_service = Arc::new(AudiobookService::new(
                storage.clone(),
                Arc::new(LopdfTextRepository::new()),
                speech.clone(),
                cloner.clone(),
                transcoder.clone(),
                PipelineSettings {
                    preview_chars: 2000,
                    default_chunk_size: DEFAULT_CHUNK_SIZE,
                    chunk_pause: Duration::ZERO,
                },
            ));
            let library_service = Arc::new(LibraryService::new(storage.clone()));

            let app = create_app(
                storage.clone(),
                Arc::new(AudiobookController::new(audiobook_service)),
                Arc::new(LibraryController::new(library_service)),
                10 * 1024 * 1024,
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(100)).await;

            Self {
                client: TestClient::new(&base_url),
                storage,
                speech,
                cloner,
                transcoder,
                data_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The data directory is removed when the TempDir drops
        }
    }
}

#[allow(dead_code)]
impl TestContext {
    pub fn book_texts_dir(&self) -> PathBuf {
        self.data_dir.path().join(BOOK_TEXTS_DIR)
    }

    pub fn voice_dir(&self) -> PathBuf {
        self.data_dir.path().join(VOICE_SAMPLES_DIR)
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.data_dir.path().join(AUDIO_CHUNKS_DIR)
    }

    /// Write an extracted text handle directly, skipping the PDF step
    pub fn write_text(&self, content: &str) -> String {
        let path = self.storage.new_text_path();
        std::fs::write(&path, content).expect("Failed to write text handle");
        path.display().to_string()
    }

    /// Upload a PDF and return the text handle from the preview
    pub async fn extract(&self, pages: &[&str]) -> String {
        let form = MultipartForm::new().file(
            "pdf_file",
            "book.pdf",
            "application/pdf",
            &fixtures::pdf_with_pages(pages),
        );
        let response = self
            .client
            .post_form("/extract_pdf_preview", form)
            .await
            .unwrap();
        response.assert_status(hyper::StatusCode::OK);
        response.field("text_file").to_string()
    }

    pub async fn generate(&self, form: MultipartForm) -> ApiResponse {
        self.client.post_form("/tts", form).await.unwrap()
    }

    /// Number of entries left in a directory
    pub fn entries(&self, dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }
}
