use super::error::{DocumentServiceError, GenerationError};
use super::model::{
    BlobContent, BlobRef, CreateDocumentRequest, Document, GenerationOutcome, ProcessingState,
    IMAGE_EXTENSION,
};
use crate::domain::tts::{AudioFormat, TtsServiceApi};
use crate::infrastructure::repositories::{
    BeginRun, BlobRepository, DocumentRepository, ImageRepository, MetadataRepository,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use uuid::Uuid;

struct ActiveRun {
    run_id: Uuid,
    handle: AbortHandle,
}

/// Collaborators of one generation run. Cloned into each spawned run task.
#[derive(Clone)]
struct Pipeline {
    document_repo: Arc<DocumentRepository>,
    blob_repo: Arc<dyn BlobRepository>,
    metadata_repo: Arc<dyn MetadataRepository>,
    image_repo: Arc<dyn ImageRepository>,
    tts_service: Arc<dyn TtsServiceApi>,
    audio_format: AudioFormat,
    runs: Arc<Mutex<HashMap<Uuid, ActiveRun>>>,
}

pub struct DocumentService {
    pipeline: Pipeline,
}

impl DocumentService {
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        blob_repo: Arc<dyn BlobRepository>,
        metadata_repo: Arc<dyn MetadataRepository>,
        image_repo: Arc<dyn ImageRepository>,
        tts_service: Arc<dyn TtsServiceApi>,
        audio_format: AudioFormat,
    ) -> Self {
        Self {
            pipeline: Pipeline {
                document_repo,
                blob_repo,
                metadata_repo,
                image_repo,
                tts_service,
                audio_format,
                runs: Arc::new(Mutex::new(HashMap::new())),
            },
        }
    }
}

#[async_trait]
pub trait DocumentServiceApi: Send + Sync {
    /// Ingest extracted text as a new document and start generating it
    async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<Document, DocumentServiceError>;

    async fn get_document(&self, id: Uuid) -> Result<Document, DocumentServiceError>;

    async fn list_documents(&self) -> Result<Vec<Document>, DocumentServiceError>;

    /// Start the first generation run of an `Idle` document
    ///
    /// The run happens in the background; progress and the final state are
    /// observable on the document.
    async fn generate(&self, id: Uuid) -> Result<Document, DocumentServiceError>;

    /// Re-run the whole pipeline for a `Failed` document
    async fn retry(&self, id: Uuid) -> Result<Document, DocumentServiceError>;

    /// Cancel any in-flight run and remove the document and its blobs
    async fn delete_document(&self, id: Uuid) -> Result<(), DocumentServiceError>;

    async fn update_playback(&self, id: Uuid, offset_seconds: f64)
        -> Result<(), DocumentServiceError>;

    async fn read_audio(&self, id: Uuid) -> Result<BlobContent, DocumentServiceError>;

    async fn read_image(&self, id: Uuid) -> Result<BlobContent, DocumentServiceError>;
}

#[async_trait]
impl DocumentServiceApi for DocumentService {
    async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<Document, DocumentServiceError> {
        if request.text.trim().is_empty() {
            return Err(DocumentServiceError::Invalid(
                "No readable text found in this document".to_string(),
            ));
        }

        let title = match request.title.trim() {
            "" => "Untitled".to_string(),
            title => title.to_string(),
        };

        let document = self
            .pipeline
            .document_repo
            .insert(Document::new(title, request.text));

        tracing::info!(
            document_id = %document.id,
            text_length = document.source_text.len(),
            "Document created"
        );

        self.start_run(document.id, ProcessingState::Idle)
    }

    async fn get_document(&self, id: Uuid) -> Result<Document, DocumentServiceError> {
        self.pipeline
            .document_repo
            .find_by_id(id)
            .ok_or(DocumentServiceError::NotFound)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, DocumentServiceError> {
        Ok(self.pipeline.document_repo.list())
    }

    async fn generate(&self, id: Uuid) -> Result<Document, DocumentServiceError> {
        self.start_run(id, ProcessingState::Idle)
    }

    async fn retry(&self, id: Uuid) -> Result<Document, DocumentServiceError> {
        self.start_run(id, ProcessingState::Failed)
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), DocumentServiceError> {
        let run = self.pipeline.runs.lock().remove(&id);
        if let Some(run) = run {
            run.handle.abort();
            tracing::info!(document_id = %id, run_id = %run.run_id, "Generation run cancelled");
        }

        let document = self
            .pipeline
            .document_repo
            .delete(id)
            .ok_or(DocumentServiceError::NotFound)?;

        for blob in [document.audio_ref, document.image_ref].into_iter().flatten() {
            if let Err(e) = self.pipeline.blob_repo.delete(&blob).await {
                tracing::warn!(document_id = %id, blob = %blob, error = %e, "Failed to delete blob");
            }
        }

        tracing::info!(document_id = %id, "Document deleted");
        Ok(())
    }

    async fn update_playback(
        &self,
        id: Uuid,
        offset_seconds: f64,
    ) -> Result<(), DocumentServiceError> {
        if !offset_seconds.is_finite() || offset_seconds < 0.0 {
            return Err(DocumentServiceError::Invalid(
                "Playback offset must be a non-negative number of seconds".to_string(),
            ));
        }

        if self
            .pipeline
            .document_repo
            .update_playback(id, offset_seconds)
        {
            Ok(())
        } else {
            Err(DocumentServiceError::NotFound)
        }
    }

    async fn read_audio(&self, id: Uuid) -> Result<BlobContent, DocumentServiceError> {
        let document = self.get_document(id).await?;
        self.read_blob(document.audio_ref).await
    }

    async fn read_image(&self, id: Uuid) -> Result<BlobContent, DocumentServiceError> {
        let document = self.get_document(id).await?;
        self.read_blob(document.image_ref).await
    }
}

impl DocumentService {
    /// Move the document into `Processing` and spawn its run
    fn start_run(
        &self,
        id: Uuid,
        expected: ProcessingState,
    ) -> Result<Document, DocumentServiceError> {
        let run_id = Uuid::new_v4();

        let document = match self.pipeline.document_repo.begin_run(id, run_id, expected) {
            BeginRun::Started(document) => document,
            BeginRun::NotFound => return Err(DocumentServiceError::NotFound),
            BeginRun::WrongState(state) => {
                return Err(DocumentServiceError::Conflict(match expected {
                    ProcessingState::Failed => {
                        format!("Only failed documents can be retried (document is {})", state)
                    }
                    _ => format!("Document cannot be generated while {}", state),
                }))
            }
        };

        tracing::info!(
            document_id = %id,
            run_id = %run_id,
            retry = expected == ProcessingState::Failed,
            "Generation run started"
        );

        // Registering under the lock keeps the run from finishing before it is tracked
        let mut runs = self.pipeline.runs.lock();
        let task = tokio::spawn(self.pipeline.clone().run(document.clone(), run_id));
        if let Some(previous) = runs.insert(
            id,
            ActiveRun {
                run_id,
                handle: task.abort_handle(),
            },
        ) {
            previous.handle.abort();
        }

        Ok(document)
    }

    async fn read_blob(&self, blob: Option<BlobRef>) -> Result<BlobContent, DocumentServiceError> {
        let blob = blob.ok_or(DocumentServiceError::NotFound)?;
        let bytes = self.pipeline.blob_repo.read(&blob).await?;
        Ok(BlobContent {
            bytes,
            content_type: blob.content_type(),
        })
    }
}

impl Pipeline {
    /// Single writer for the document during a run: progress notifications
    /// from synthesis arrive over a channel and are applied here, followed by
    /// exactly one commit or failure.
    async fn run(self, document: Document, run_id: Uuid) {
        let id = document.id;
        let start_time = std::time::Instant::now();
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<f64>();

        let work = self.produce(&document.source_text, progress_tx);
        tokio::pin!(work);

        let result = loop {
            tokio::select! {
                biased;
                Some(progress) = progress_rx.recv() => {
                    self.document_repo.update_progress(id, run_id, progress);
                }
                result = &mut work => break result,
            }
        };

        while let Ok(progress) = progress_rx.try_recv() {
            self.document_repo.update_progress(id, run_id, progress);
        }

        match result {
            Ok(outcome) => {
                let blobs = [outcome.audio_ref.clone(), outcome.image_ref.clone()];
                if self.document_repo.commit(id, run_id, outcome) {
                    tracing::info!(
                        document_id = %id,
                        run_id = %run_id,
                        latency_ms = start_time.elapsed().as_millis(),
                        "Generation run committed"
                    );
                } else {
                    tracing::warn!(document_id = %id, run_id = %run_id, "Run is stale, discarding output");
                    for blob in &blobs {
                        if let Err(e) = self.blob_repo.delete(blob).await {
                            tracing::warn!(document_id = %id, blob = %blob, error = %e, "Failed to delete blob");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    document_id = %id,
                    run_id = %run_id,
                    error = %e,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Generation run failed"
                );
                self.document_repo.fail(id, run_id, e.to_string());
            }
        }

        let mut runs = self.runs.lock();
        if runs.get(&id).is_some_and(|run| run.run_id == run_id) {
            runs.remove(&id);
        }
    }

    /// Metadata gates the image prompt but not synthesis; audio and artwork
    /// proceed side by side and the first failure cancels the other.
    async fn produce(
        &self,
        text: &str,
        progress_tx: mpsc::UnboundedSender<f64>,
    ) -> Result<GenerationOutcome, GenerationError> {
        let on_progress = Box::new(move |progress: f64| {
            let _ = progress_tx.send(progress);
        });

        let audio = async {
            self.tts_service
                .synthesize_text(text, on_progress)
                .await
                .map_err(GenerationError::from)
        };

        let artwork = async {
            let metadata = self.metadata_repo.extract_metadata(text).await?;
            let image = self
                .image_repo
                .generate_image(&metadata.image_prompt())
                .await?;
            Ok::<_, GenerationError>((metadata, image))
        };

        let (audio, (metadata, image)) = tokio::try_join!(audio, artwork)?;

        let audio_ref = self
            .blob_repo
            .write(&audio, self.audio_format.extension())
            .await?;
        let image_ref = match self.blob_repo.write(&image, IMAGE_EXTENSION).await {
            Ok(blob) => blob,
            Err(e) => {
                if let Err(cleanup) = self.blob_repo.delete(&audio_ref).await {
                    tracing::warn!(blob = %audio_ref, error = %cleanup, "Failed to delete blob");
                }
                return Err(e.into());
            }
        };

        Ok(GenerationOutcome {
            title: metadata.title,
            author: metadata.author,
            audio_ref,
            image_ref,
        })
    }
}
