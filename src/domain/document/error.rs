use crate::domain::credential::CredentialError;
use crate::domain::tts::{ChunkingError, SynthesisError, TtsServiceError};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Request(String),
    #[error("metadata backend returned no content")]
    EmptyResponse,
    #[error("metadata response is not valid JSON: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Request(String),
    #[error("API Error: {status} - {body}")]
    Backend { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("blob {0} not found")]
    NotFound(String),
    #[error("blob storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any stage failure of a generation run. The `Display` text is what the
/// failed document shows to the user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Could not split text for synthesis: {0}")]
    Chunking(#[from] ChunkingError),
    #[error("{0}")]
    Credential(#[from] CredentialError),
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Metadata extraction failed: {0}")]
    Metadata(#[from] MetadataError),
    #[error("Cover image generation failed: {0}")]
    Image(#[from] ImageError),
    #[error("Failed to save generated files: {0}")]
    Storage(#[from] StorageError),
}

impl From<TtsServiceError> for GenerationError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Chunking(e) => GenerationError::Chunking(e),
            TtsServiceError::Synthesis(SynthesisError::Credential(e)) => {
                GenerationError::Credential(e)
            }
            TtsServiceError::Synthesis(e) => GenerationError::Synthesis(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentServiceError {
    #[error("document not found")]
    NotFound,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<StorageError> for DocumentServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => DocumentServiceError::NotFound,
            other => DocumentServiceError::Dependency(other.to_string()),
        }
    }
}

impl From<DocumentServiceError> for AppError {
    fn from(err: DocumentServiceError) -> Self {
        match err {
            DocumentServiceError::NotFound => AppError::NotFound("Document not found".to_string()),
            DocumentServiceError::Invalid(msg) => AppError::BadRequest(msg),
            DocumentServiceError::Conflict(msg) => AppError::Conflict(msg),
            DocumentServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
