pub mod chunker;
pub mod error;
pub mod format;
pub mod service;
pub mod synthesizer;

pub use chunker::{split, Chunk};
pub use error::{ChunkingError, SynthesisError, TtsServiceError};
pub use format::AudioFormat;
pub use service::{TtsService, TtsServiceApi};
pub use synthesizer::{synthesize_bounded, BoundedSynthesizer, DEFAULT_MAX_CONCURRENCY};
