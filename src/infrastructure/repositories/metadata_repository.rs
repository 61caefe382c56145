use crate::domain::document::{DocumentMetadata, MetadataError};
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_METADATA_MODEL: &str = "arcee-ai/trinity-large-preview:free";

/// Only the beginning of a document is sent for metadata extraction
const SAMPLE_CHARS: usize = 2000;

/// Extracts title and author from a document's text
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn extract_metadata(&self, text: &str) -> Result<DocumentMetadata, MetadataError>;
}

/// OpenAI-compatible chat completion backend (OpenRouter by default)
pub struct OpenRouterMetadataRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenRouterMetadataRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    pub fn client_for(api_key: &str, api_base: &str) -> Client<OpenAIConfig> {
        Client::with_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base),
        )
    }
}

fn sample(text: &str) -> &str {
    match text.char_indices().nth(SAMPLE_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract the book title and author name from the following text.\n\
         Return ONLY a JSON object with keys \"title\" and \"author\".\n\
         If you cannot find the author, use \"Unknown\".\n\n\
         Text:\n{}",
        sample(text)
    )
}

/// Parse the model's reply, tolerating a surrounding markdown code fence
fn parse_metadata(content: &str) -> Result<DocumentMetadata, MetadataError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(json).map_err(|e| MetadataError::Malformed(e.to_string()))
}

#[async_trait]
impl MetadataRepository for OpenRouterMetadataRepository {
    async fn extract_metadata(&self, text: &str) -> Result<DocumentMetadata, MetadataError> {
        let start_time = std::time::Instant::now();

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(build_prompt(text))
            .build()
            .map_err(|e| MetadataError::Request(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([message.into()])
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| MetadataError::Request(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!(error = %e, model = %self.model, "Metadata extraction call failed");
            MetadataError::Request(e.to_string())
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(MetadataError::EmptyResponse)?;

        let metadata = parse_metadata(&content)?;

        tracing::info!(
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            title = %metadata.title,
            author = %metadata.author,
            "Metadata extracted"
        );

        Ok(metadata)
    }
}
