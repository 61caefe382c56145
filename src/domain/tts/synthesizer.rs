use super::chunker::Chunk;
use super::error::SynthesisError;
use crate::infrastructure::repositories::TtsRepository;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Runs chunk synthesis through a fixed-size sliding window and reassembles
/// the audio in chunk order.
pub struct BoundedSynthesizer {
    tts_repo: Arc<dyn TtsRepository>,
    max_concurrency: usize,
}

impl BoundedSynthesizer {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, max_concurrency: usize) -> Self {
        Self {
            tts_repo,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub async fn synthesize<P>(
        &self,
        chunks: &[Chunk],
        on_progress: P,
    ) -> Result<Vec<u8>, SynthesisError>
    where
        P: Fn(f64),
    {
        if !chunks.is_empty() {
            // One credential fetch up front instead of one per worker
            self.tts_repo.prepare().await?;
        }

        let tts_repo = &self.tts_repo;
        synthesize_bounded(
            chunks,
            self.max_concurrency,
            |chunk| async move { tts_repo.synthesize_chunk(&chunk.text).await },
            on_progress,
        )
        .await
    }
}

/// Sliding-window worker pool over `chunks`.
///
/// At most `max_concurrency` calls to `synthesize_one` are in flight. Progress
/// is `completed / total` after each completion. The first failure abandons
/// the run and drops every outstanding call.
pub async fn synthesize_bounded<'a, F, Fut, P>(
    chunks: &'a [Chunk],
    max_concurrency: usize,
    synthesize_one: F,
    on_progress: P,
) -> Result<Vec<u8>, SynthesisError>
where
    F: Fn(&'a Chunk) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, SynthesisError>>,
    P: Fn(f64),
{
    let total = chunks.len();
    if total == 0 {
        on_progress(1.0);
        return Ok(Vec::new());
    }

    let window = max_concurrency.max(1);
    let mut results: Vec<Option<Vec<u8>>> = vec![None; total];
    let mut in_flight = FuturesUnordered::new();
    let mut pending = chunks.iter().enumerate();
    let mut completed = 0usize;

    let tag = |index: usize, chunk: &'a Chunk| {
        let call = synthesize_one(chunk);
        async move { (index, call.await) }
    };

    for (index, chunk) in pending.by_ref().take(window) {
        in_flight.push(tag(index, chunk));
    }

    while let Some((index, outcome)) = in_flight.next().await {
        let audio = outcome.map_err(|e| {
            tracing::error!(
                chunk_index = index,
                completed,
                total,
                error = %e,
                "Chunk synthesis failed, abandoning run"
            );
            e
        })?;

        tracing::debug!(
            chunk_index = index,
            audio_size = audio.len(),
            "Chunk synthesized"
        );

        results[index] = Some(audio);
        completed += 1;
        on_progress(completed as f64 / total as f64);

        if let Some((next_index, chunk)) = pending.next() {
            in_flight.push(tag(next_index, chunk));
        }
    }

    Ok(results.into_iter().flatten().flatten().collect())
}
