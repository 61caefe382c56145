use crate::domain::credential::CredentialError;

#[derive(Debug, thiserror::Error)]
pub enum ChunkingError {
    #[error("chunk limit of {limit} bytes cannot hold the character {character:?}")]
    LimitTooSmall { limit: usize, character: char },
    #[error("text splitting was interrupted: {0}")]
    Aborted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("TTS backend rejected chunk ({status} {code}): {message}")]
    Backend {
        code: i64,
        status: String,
        message: String,
    },
    #[error("TTS request failed: {0}")]
    Network(String),
    #[error("Failed to decode the TTS response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("Could not split text for synthesis: {0}")]
    Chunking(#[from] ChunkingError),
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}
