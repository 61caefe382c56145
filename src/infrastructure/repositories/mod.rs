pub mod blob_repository;
pub mod document_repository;
pub mod google_tts_repository;
pub mod image_repository;
pub mod metadata_repository;
pub mod search_repository;
pub mod tts_repository;

pub use blob_repository::{BlobRepository, FsBlobRepository};
pub use document_repository::{BeginRun, DocumentRepository};
pub use google_tts_repository::{GoogleTtsRepository, VoiceSettings};
pub use image_repository::{HttpImageRepository, ImageRepository};
pub use metadata_repository::{MetadataRepository, OpenRouterMetadataRepository};
pub use search_repository::{ExaSearchRepository, SearchRepository, SearchResult};
pub use tts_repository::TtsRepository;
