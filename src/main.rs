use audify_backend::controllers::{document::DocumentController, search::SearchController};
use audify_backend::domain::credential::CredentialCache;
use audify_backend::domain::document::DocumentService;
use audify_backend::domain::tts::TtsService;
use audify_backend::infrastructure::config::{Config, LogFormat};
use audify_backend::infrastructure::http::{build_router, start_http_server};
use audify_backend::infrastructure::oauth::GoogleTokenProvider;
use audify_backend::infrastructure::repositories::{
    DocumentRepository, ExaSearchRepository, FsBlobRepository, GoogleTtsRepository,
    HttpImageRepository, OpenRouterMetadataRepository, SearchRepository, VoiceSettings,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Audify Backend on {}:{}",
        config.host,
        config.port
    );

    tokio::fs::create_dir_all(&config.data_dir).await?;
    tracing::info!(data_dir = %config.data_dir.display(), "Blob storage ready");

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Credentials
    let token_provider = Arc::new(GoogleTokenProvider::new(
        config.google_credentials_path.clone(),
    ));
    let credentials = Arc::new(CredentialCache::new(token_provider));

    // 2. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let tts_repo = Arc::new(GoogleTtsRepository::new(
        credentials,
        VoiceSettings {
            language_code: config.tts_language_code.clone(),
            voice_name: config.tts_voice_name.clone(),
            audio_encoding: config.tts_audio_encoding,
            speaking_rate: config.tts_speaking_rate,
        },
    ));
    let metadata_client = Arc::new(OpenRouterMetadataRepository::client_for(
        &config.openrouter_api_key,
        &config.openrouter_api_base,
    ));
    let metadata_repo = Arc::new(OpenRouterMetadataRepository::new(
        metadata_client,
        config.metadata_model.clone(),
    ));
    let image_repo = Arc::new(HttpImageRepository::new(
        config.image_api_url.clone(),
        config.image_api_token.clone(),
    ));
    let blob_repo = Arc::new(FsBlobRepository::new(config.data_dir.clone()));
    let document_repo = Arc::new(DocumentRepository::new());
    let search_repo = config.exa_api_key.clone().map(|api_key| {
        Arc::new(ExaSearchRepository::new(api_key)) as Arc<dyn SearchRepository>
    });
    if search_repo.is_none() {
        tracing::warn!("EXA_API_KEY not set, PDF search is disabled");
    }

    // 3. Instantiate services
    tracing::info!("Instantiating services...");
    let tts_service = Arc::new(TtsService::new(
        tts_repo,
        config.tts_max_chunk_bytes,
        config.tts_max_concurrency,
    ));
    let document_service = Arc::new(DocumentService::new(
        document_repo,
        blob_repo,
        metadata_repo,
        image_repo,
        tts_service,
        config.tts_audio_encoding,
    ));

    // 4. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let document_controller = Arc::new(DocumentController::new(document_service));
    let search_controller = Arc::new(SearchController::new(search_repo));

    let app = build_router(
        Arc::new(config.data_dir.clone()),
        document_controller,
        search_controller,
    );

    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "audify_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "audify_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
