use anyhow::Result;
use audify_backend::controllers::{document::DocumentController, search::SearchController};
use audify_backend::domain::document::DocumentService;
use audify_backend::domain::tts::{AudioFormat, TtsService};
use audify_backend::infrastructure::http::build_router;
use audify_backend::infrastructure::repositories::{
    DocumentRepository, FsBlobRepository, SearchRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod assertions;

use api_client::TestClient;
use fakes::{FakeImage, FakeMetadata, FakeSearch, FakeTts};

/// Small chunk limit so short fixtures still fan out over several chunks
const TEST_MAX_CHUNK_BYTES: usize = 64;
const TEST_MAX_CONCURRENCY: usize = 3;

pub struct TestContext {
    pub client: TestClient,
    pub tts: Arc<FakeTts>,
    pub metadata: Arc<FakeMetadata>,
    _data_dir: TempDir,
}

#[derive(Clone, Copy)]
pub struct AppOptions {
    pub search_enabled: bool,
    pub audio_format: AudioFormat,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            search_enabled: true,
            audio_format: AudioFormat::Mp3,
        }
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            spawn_app(AppOptions::default())
                .await
                .expect("Failed to start app")
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Blob directory is removed when the TempDir drops
        }
    }
}

/// Boot the full router with fake backends on an ephemeral port
pub async fn spawn_app(options: AppOptions) -> Result<TestContext> {
    let data_dir = tempfile::tempdir()?;

    let tts = Arc::new(FakeTts::default());
    let metadata = Arc::new(FakeMetadata::default());

    let tts_service = Arc::new(TtsService::new(
        tts.clone(),
        TEST_MAX_CHUNK_BYTES,
        TEST_MAX_CONCURRENCY,
    ));
    let document_service = Arc::new(DocumentService::new(
        Arc::new(DocumentRepository::new()),
        Arc::new(FsBlobRepository::new(data_dir.path().join("blobs"))),
        metadata.clone(),
        Arc::new(FakeImage),
        tts_service,
        options.audio_format,
    ));

    let search_repo = options
        .search_enabled
        .then(|| Arc::new(FakeSearch) as Arc<dyn SearchRepository>);

    let app = build_router(
        Arc::new(data_dir.path().to_path_buf()),
        Arc::new(DocumentController::new(document_service)),
        Arc::new(SearchController::new(search_repo)),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(TestContext {
        client: TestClient::new(&base_url),
        tts,
        metadata,
        _data_dir: data_dir,
    })
}

impl TestContext {
    /// Create a document and return its JSON representation
    pub async fn create_document(&self, title: &str, text: &str) -> Value {
        let response = self
            .client
            .post("/api/documents", &json!({ "title": title, "text": text }))
            .await
            .unwrap();
        response.body.expect("Missing document body")
    }

    /// Poll until the document leaves `processing`
    pub async fn wait_for_settled(&self, id: &str) -> Value {
        for _ in 0..200 {
            let response = self
                .client
                .get(&format!("/api/documents/{}", id))
                .await
                .unwrap();
            let document = response.body.expect("Missing document body");
            if document["state"] != "processing" {
                return document;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("document {} did not settle", id);
    }
}

pub fn document_id(document: &Value) -> String {
    document["id"]
        .as_str()
        .expect("Missing document id")
        .to_string()
}
