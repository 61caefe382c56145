use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    infrastructure::repositories::{SearchRepository, SearchResult},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub struct SearchController {
    search_repo: Option<Arc<dyn SearchRepository>>,
}

impl SearchController {
    /// `None` leaves the endpoint mounted but unavailable
    pub fn new(search_repo: Option<Arc<dyn SearchRepository>>) -> Self {
        Self { search_repo }
    }

    /// GET /api/search?q= - Find PDFs to import
    pub async fn search(
        State(controller): State<Arc<SearchController>>,
        Query(query): Query<SearchQuery>,
    ) -> AppResult<Json<Vec<SearchResult>>> {
        let search_repo = controller.search_repo.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("PDF search is not configured".to_string())
        })?;

        let query = query.q.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query cannot be empty".to_string()));
        }

        let results = search_repo
            .search_pdfs(query)
            .await
            .map_err(AppError::ExternalService)?;

        Ok(Json(results))
    }
}
