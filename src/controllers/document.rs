use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::document::{
        CreateDocumentRequest, DocumentResponse, DocumentService, DocumentServiceApi,
        PlaybackRequest,
    },
    error::AppResult,
};

pub struct DocumentController {
    document_service: Arc<DocumentService>,
}

impl DocumentController {
    pub fn new(document_service: Arc<DocumentService>) -> Self {
        Self { document_service }
    }

    /// POST /api/documents - Import extracted text and start generating
    pub async fn create_document(
        State(controller): State<Arc<DocumentController>>,
        Json(request): Json<CreateDocumentRequest>,
    ) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
        let document = controller.document_service.create_document(request).await?;
        Ok((StatusCode::CREATED, Json(document.into())))
    }

    /// GET /api/documents - List documents, newest first
    pub async fn list_documents(
        State(controller): State<Arc<DocumentController>>,
    ) -> AppResult<Json<Vec<DocumentResponse>>> {
        let documents = controller.document_service.list_documents().await?;
        Ok(Json(documents.into_iter().map(Into::into).collect()))
    }

    /// GET /api/documents/{id}
    pub async fn get_document(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<Json<DocumentResponse>> {
        let document = controller.document_service.get_document(id).await?;
        Ok(Json(document.into()))
    }

    /// POST /api/documents/{id}/generate
    pub async fn generate(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
        let document = controller.document_service.generate(id).await?;
        Ok((StatusCode::ACCEPTED, Json(document.into())))
    }

    /// POST /api/documents/{id}/retry
    pub async fn retry(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
        let document = controller.document_service.retry(id).await?;
        Ok((StatusCode::ACCEPTED, Json(document.into())))
    }

    /// DELETE /api/documents/{id}
    pub async fn delete_document(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller.document_service.delete_document(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// PUT /api/documents/{id}/playback
    pub async fn update_playback(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
        Json(request): Json<PlaybackRequest>,
    ) -> AppResult<StatusCode> {
        controller
            .document_service
            .update_playback(id, request.offset_seconds)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET /api/documents/{id}/audio
    pub async fn get_audio(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<impl IntoResponse> {
        let audio = controller.document_service.read_audio(id).await?;
        Ok(([(header::CONTENT_TYPE, audio.content_type)], audio.bytes))
    }

    /// GET /api/documents/{id}/image
    pub async fn get_image(
        State(controller): State<Arc<DocumentController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<impl IntoResponse> {
        let image = controller.document_service.read_image(id).await?;
        Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
    }
}
