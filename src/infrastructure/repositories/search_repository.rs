use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const EXA_SEARCH_URL: &str = "https://api.exa.ai/search";
const MAX_RESULTS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    category: &'a str,
    use_autoprompt: bool,
    num_results: u32,
}

/// Finds candidate source documents on the web
#[async_trait]
pub trait SearchRepository: Send + Sync {
    async fn search_pdfs(&self, query: &str) -> Result<Vec<SearchResult>, String>;
}

pub struct ExaSearchRepository {
    http_client: reqwest::Client,
    api_key: String,
}

impl ExaSearchRepository {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
        }
    }
}

/// Keep results whose URL plausibly points at a PDF
pub fn filter_pdf_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| r.url.to_lowercase().contains("pdf"))
        .collect()
}

#[async_trait]
impl SearchRepository for ExaSearchRepository {
    async fn search_pdfs(&self, query: &str) -> Result<Vec<SearchResult>, String> {
        let request = SearchRequest {
            query,
            category: "pdf",
            use_autoprompt: true,
            num_results: MAX_RESULTS,
        };

        let response = self
            .http_client
            .post(EXA_SEARCH_URL)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Search request failed: {}", e))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("API Error: {}", error_text));
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| format!("Failed to parse search response: {}", e))?;

        let total = parsed.results.len();
        let results = filter_pdf_results(parsed.results);
        tracing::info!(
            query = %query,
            total_results = total,
            pdf_results = results.len(),
            "PDF search completed"
        );

        Ok(results)
    }
}
