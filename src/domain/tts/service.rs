use super::chunker::split;
use super::error::{ChunkingError, TtsServiceError};
use super::synthesizer::BoundedSynthesizer;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Google TTS rejects requests above 5000 bytes; stay well under it
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 4000;

pub struct TtsService {
    synthesizer: BoundedSynthesizer,
    max_chunk_bytes: usize,
}

impl TtsService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        max_chunk_bytes: usize,
        max_concurrency: usize,
    ) -> Self {
        Self {
            synthesizer: BoundedSynthesizer::new(tts_repo, max_concurrency),
            max_chunk_bytes,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize an arbitrarily long text into one audio stream
    ///
    /// This operation:
    /// - Splits the text into backend-legal chunks
    /// - Synthesizes chunks concurrently under the configured bound
    /// - Reports `completed / total` through `on_progress`
    ///
    /// Returns the chunk audio concatenated in text order
    async fn synthesize_text(
        &self,
        text: &str,
        on_progress: Box<dyn Fn(f64) + Send + Sync>,
    ) -> Result<Vec<u8>, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize_text(
        &self,
        text: &str,
        on_progress: Box<dyn Fn(f64) + Send + Sync>,
    ) -> Result<Vec<u8>, TtsServiceError> {
        let start_time = std::time::Instant::now();

        // Splitting is CPU-bound over the whole document
        let owned_text = text.to_string();
        let max_chunk_bytes = self.max_chunk_bytes;
        let chunks = tokio::task::spawn_blocking(move || split(&owned_text, max_chunk_bytes))
            .await
            .map_err(|e| ChunkingError::Aborted(e.to_string()))??;
        tracing::info!(
            chunk_count = chunks.len(),
            text_bytes = text.len(),
            max_chunk_bytes = self.max_chunk_bytes,
            "Text split into chunks"
        );

        let audio_data = self.synthesizer.synthesize(&chunks, on_progress).await?;

        let duration = start_time.elapsed();
        let throughput_chars_per_sec = if duration.as_secs_f64() > 0.0 {
            text.chars().count() as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        tracing::info!(
            latency_ms = duration.as_millis(),
            chunk_count = chunks.len(),
            audio_size_bytes = audio_data.len(),
            throughput_chars_per_sec = format!("{:.2}", throughput_chars_per_sec),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}
