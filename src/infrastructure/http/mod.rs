use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use crate::controllers::{document::DocumentController, health, search::SearchController};
use crate::infrastructure::config::Config;

/// Assemble every route of the service
pub fn build_router(
    data_dir: Arc<PathBuf>,
    document_controller: Arc<DocumentController>,
    search_controller: Arc<SearchController>,
) -> Router {
    let document_routes = Router::new()
        .route(
            "/api/documents",
            get(DocumentController::list_documents).post(DocumentController::create_document),
        )
        .route(
            "/api/documents/:id",
            get(DocumentController::get_document).delete(DocumentController::delete_document),
        )
        .route("/api/documents/:id/generate", post(DocumentController::generate))
        .route("/api/documents/:id/retry", post(DocumentController::retry))
        .route(
            "/api/documents/:id/playback",
            put(DocumentController::update_playback),
        )
        .route("/api/documents/:id/audio", get(DocumentController::get_audio))
        .route("/api/documents/:id/image", get(DocumentController::get_image))
        .with_state(document_controller);

    let search_routes = Router::new()
        .route("/api/search", get(SearchController::search))
        .with_state(search_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(data_dir)
        .merge(document_routes)
        .merge(search_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(CorsLayer::permissive()),
        )
}

/// Start the HTTP server on the configured address
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

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
