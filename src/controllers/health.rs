use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once the blob directory exists and is usable
pub async fn health_ready(State(data_dir): State<Arc<PathBuf>>) -> impl IntoResponse {
    match tokio::fs::create_dir_all(data_dir.as_path()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "storage": "available",
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, data_dir = %data_dir.display(), "Blob storage unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "storage": "unavailable",
                })),
            )
        }
    }
}
