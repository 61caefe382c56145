use crate::domain::tts::AudioFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const IMAGE_EXTENSION: &str = "jpg";

/// Opaque reference to a stored audio or image blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub String);

impl BlobRef {
    /// Media type implied by the extension the blob was written with
    pub fn content_type(&self) -> &'static str {
        let extension = self.0.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        match AudioFormat::from_extension(extension) {
            Some(format) => format.content_type(),
            None if extension == IMAGE_EXTENSION => "image/jpeg",
            None => "application/octet-stream",
        }
    }
}

/// Stored bytes together with the media type to serve them as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContent {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Idle,
    Processing,
    Ready,
    Failed,
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingState::Idle => write!(f, "idle"),
            ProcessingState::Processing => write!(f, "processing"),
            ProcessingState::Ready => write!(f, "ready"),
            ProcessingState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub source_text: String,
    pub audio_ref: Option<BlobRef>,
    pub image_ref: Option<BlobRef>,
    pub state: ProcessingState,
    pub progress: f64,
    pub error_message: Option<String>,
    pub last_playback_offset: f64,
    pub created_at: DateTime<Utc>,
    /// Generation run currently allowed to write to this document
    pub active_run: Option<Uuid>,
}

impl Document {
    pub fn new(title: String, source_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            author: None,
            source_text,
            audio_ref: None,
            image_ref: None,
            state: ProcessingState::Idle,
            progress: 0.0,
            error_message: None,
            last_playback_offset: 0.0,
            created_at: Utc::now(),
            active_run: None,
        }
    }

    /// Enter `Processing` for a new run
    pub fn begin_run(&mut self, run_id: Uuid) {
        self.state = ProcessingState::Processing;
        self.progress = 0.0;
        self.error_message = None;
        self.active_run = Some(run_id);
    }

    /// Swap in every content field of a successful run at once
    pub fn commit(&mut self, outcome: GenerationOutcome) {
        self.title = outcome.title;
        self.author = Some(outcome.author);
        self.audio_ref = Some(outcome.audio_ref);
        self.image_ref = Some(outcome.image_ref);
        self.state = ProcessingState::Ready;
        self.progress = 1.0;
        self.error_message = None;
        self.active_run = None;
    }

    /// Mark the run failed; content fields and progress stay as they were
    pub fn fail(&mut self, message: String) {
        self.state = ProcessingState::Failed;
        self.error_message = Some(message);
        self.active_run = None;
    }
}

/// Everything a successful run writes to its document
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub title: String,
    pub author: String,
    pub audio_ref: BlobRef,
    pub image_ref: BlobRef,
}

/// Title and author derived from the source text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    #[serde(default = "unknown_author")]
    pub author: String,
}

fn unknown_author() -> String {
    "Unknown".to_string()
}

impl DocumentMetadata {
    pub fn image_prompt(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// Request for POST /api/documents
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub text: String,
}

/// Request for PUT /api/documents/{id}/playback
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub offset_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub text_length: usize,
    pub audio_ref: Option<BlobRef>,
    pub image_ref: Option<BlobRef>,
    pub state: ProcessingState,
    pub progress: f64,
    pub error_message: Option<String>,
    pub last_playback_offset: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            title: document.title,
            author: document.author,
            text_length: document.source_text.chars().count(),
            audio_ref: document.audio_ref,
            image_ref: document.image_ref,
            state: document.state,
            progress: document.progress,
            error_message: document.error_message,
            last_playback_offset: document.last_playback_offset,
            created_at: document.created_at,
        }
    }
}
