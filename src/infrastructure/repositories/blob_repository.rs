use crate::domain::document::{BlobRef, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Durable storage for opaque audio and image payloads
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// Store `bytes` under a fresh identifier with the given file extension
    async fn write(&self, bytes: &[u8], extension: &str) -> Result<BlobRef, StorageError>;

    async fn read(&self, blob: &BlobRef) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, blob: &BlobRef) -> Result<(), StorageError>;
}

/// Blob storage backed by a local directory
pub struct FsBlobRepository {
    root: PathBuf,
}

impl FsBlobRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a blob reference to a path, refusing anything outside `root`
    fn path_for(&self, blob: &BlobRef) -> Result<PathBuf, StorageError> {
        let name = Path::new(&blob.0);
        let is_plain_file_name = name.file_name().map(|f| f == name.as_os_str()) == Some(true);
        if !is_plain_file_name {
            return Err(StorageError::NotFound(blob.0.clone()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobRepository for FsBlobRepository {
    async fn write(&self, bytes: &[u8], extension: &str) -> Result<BlobRef, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let blob = BlobRef(format!("{}.{}", Uuid::new_v4(), extension));
        let path = self.path_for(&blob)?;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(blob = %blob, size_bytes = bytes.len(), "Blob written");
        Ok(blob)
    }

    async fn read(&self, blob: &BlobRef) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(blob)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(blob.0.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, blob: &BlobRef) -> Result<(), StorageError> {
        let path = self.path_for(blob)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
