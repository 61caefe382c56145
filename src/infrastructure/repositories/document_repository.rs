use crate::domain::document::{Document, GenerationOutcome, ProcessingState};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Result of trying to move a document into `Processing`
#[derive(Debug)]
pub enum BeginRun {
    Started(Document),
    NotFound,
    WrongState(ProcessingState),
}

/// In-memory document store.
///
/// Writes on behalf of a generation run carry the run id and are dropped
/// when that run is no longer the document's active run.
#[derive(Default)]
pub struct DocumentRepository {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl DocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: Document) -> Document {
        self.documents
            .write()
            .insert(document.id, document.clone());
        document
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Document> {
        self.documents.read().get(&id).cloned()
    }

    /// All documents, newest first
    pub fn list(&self) -> Vec<Document> {
        let mut documents: Vec<Document> = self.documents.read().values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        documents
    }

    pub fn delete(&self, id: Uuid) -> Option<Document> {
        self.documents.write().remove(&id)
    }

    /// Check the state and start a run in one step
    pub fn begin_run(&self, id: Uuid, run_id: Uuid, expected: ProcessingState) -> BeginRun {
        let mut documents = self.documents.write();
        let Some(document) = documents.get_mut(&id) else {
            return BeginRun::NotFound;
        };

        if document.state != expected {
            return BeginRun::WrongState(document.state);
        }

        document.begin_run(run_id);
        BeginRun::Started(document.clone())
    }

    /// Record run progress; never moves progress backwards
    pub fn update_progress(&self, id: Uuid, run_id: Uuid, progress: f64) -> bool {
        self.with_active_run(id, run_id, |document| {
            document.progress = document.progress.max(progress.clamp(0.0, 1.0));
        })
    }

    pub fn commit(&self, id: Uuid, run_id: Uuid, outcome: GenerationOutcome) -> bool {
        self.with_active_run(id, run_id, |document| document.commit(outcome))
    }

    pub fn fail(&self, id: Uuid, run_id: Uuid, message: String) -> bool {
        self.with_active_run(id, run_id, |document| document.fail(message))
    }

    pub fn update_playback(&self, id: Uuid, offset_seconds: f64) -> bool {
        match self.documents.write().get_mut(&id) {
            Some(document) => {
                document.last_playback_offset = offset_seconds;
                true
            }
            None => false,
        }
    }

    fn with_active_run<F>(&self, id: Uuid, run_id: Uuid, apply: F) -> bool
    where
        F: FnOnce(&mut Document),
    {
        let mut documents = self.documents.write();
        match documents.get_mut(&id) {
            Some(document) if document.active_run == Some(run_id) => {
                apply(document);
                true
            }
            _ => false,
        }
    }
}
