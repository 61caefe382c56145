use crate::domain::document::ImageError;
use async_trait::async_trait;
use serde::Serialize;

/// Generates cover art from a text prompt
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

/// HTTP image backend that answers a `{prompt}` POST with raw image bytes
pub struct HttpImageRepository {
    http_client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpImageRepository {
    pub fn new(endpoint: String, token: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl ImageRepository for HttpImageRepository {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let start_time = std::time::Instant::now();
        tracing::info!(prompt = %prompt, "Requesting cover image");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&ImageRequest { prompt })
            .send()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = status.as_u16(), body = %body, "Image backend returned error");
            return Err(ImageError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let image = response
            .bytes()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?
            .to_vec();

        tracing::info!(
            latency_ms = start_time.elapsed().as_millis(),
            image_size_bytes = image.len(),
            "Cover image generated"
        );

        Ok(image)
    }
}
