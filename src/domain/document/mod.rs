pub mod error;
pub mod model;
pub mod service;

pub use error::{DocumentServiceError, GenerationError, ImageError, MetadataError, StorageError};
pub use model::{
    BlobContent, BlobRef, CreateDocumentRequest, Document, DocumentMetadata, DocumentResponse,
    GenerationOutcome, PlaybackRequest, ProcessingState,
};
pub use service::{DocumentService, DocumentServiceApi};
