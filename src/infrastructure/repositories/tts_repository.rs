use crate::domain::tts::SynthesisError;
use async_trait::async_trait;

/// Repository for single-chunk TTS synthesis.
/// Abstracts the underlying TTS provider (Google Cloud TTS, test doubles, etc.)
///
/// Callers are responsible for keeping each chunk under the provider's
/// request size limit and for merging chunk audio in order.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Warm up whatever the provider needs before a burst of chunk requests
    /// (e.g. obtain a bearer token once so concurrent chunks share it)
    async fn prepare(&self) -> Result<(), SynthesisError> {
        Ok(())
    }

    /// Synthesize one chunk of text
    ///
    /// Returns raw audio bytes for the chunk (MP3 by default)
    ///
    /// # Errors
    /// Returns error if the provider rejects the chunk, the request fails,
    /// or the returned payload cannot be decoded
    async fn synthesize_chunk(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}
