use super::tts_repository::TtsRepository;
use crate::domain::credential::CredentialCache;
use crate::domain::tts::{AudioFormat, SynthesisError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1beta1/text:synthesize";
const QUOTA_PROJECT_HEADER: &str = "X-Goog-User-Project";

/// Voice and encoding sent with every chunk
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub language_code: String,
    pub voice_name: String,
    pub audio_encoding: AudioFormat,
    pub speaking_rate: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            voice_name: "en-US-Chirp3-HD-Achernar".to_string(),
            audio_encoding: AudioFormat::Mp3,
            speaking_rate: 1.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
    speaking_rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    code: i64,
    message: String,
    status: String,
}

/// Google Cloud Text-to-Speech implementation of TTS repository
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    credentials: Arc<CredentialCache>,
    voice: VoiceSettings,
    endpoint: String,
}

impl GoogleTtsRepository {
    pub fn new(credentials: Arc<CredentialCache>, voice: VoiceSettings) -> Self {
        Self::with_endpoint(credentials, voice, GOOGLE_TTS_URL.to_string())
    }

    pub fn with_endpoint(
        credentials: Arc<CredentialCache>,
        voice: VoiceSettings,
        endpoint: String,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            credentials,
            voice,
            endpoint,
        }
    }

    fn request_body<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: self.voice.audio_encoding.encoding(),
                speaking_rate: self.voice.speaking_rate,
            },
        }
    }
}

/// Map a non-success TTS response body to a `SynthesisError`
fn backend_error(status: reqwest::StatusCode, body: &str) -> SynthesisError {
    match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(parsed) => SynthesisError::Backend {
            code: parsed.error.code,
            status: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => SynthesisError::Backend {
            code: i64::from(status.as_u16()),
            status: status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
            message: body.to_string(),
        },
    }
}

fn decode_audio(body: &[u8]) -> Result<Vec<u8>, SynthesisError> {
    let response: SynthesizeResponse =
        serde_json::from_slice(body).map_err(|e| SynthesisError::Decode(e.to_string()))?;

    general_purpose::STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| SynthesisError::Decode(e.to_string()))
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn prepare(&self) -> Result<(), SynthesisError> {
        self.credentials.get_token().await?;
        Ok(())
    }

    async fn synthesize_chunk(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let credential = self.credentials.get_token().await?;

        tracing::debug!(
            voice = %self.voice.voice_name,
            language = %self.voice.language_code,
            text_bytes = text.len(),
            "Calling Google TTS synthesize"
        );

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&credential.token)
            .json(&self.request_body(text));

        if let Some(project_id) = &credential.project_id {
            request = request.header(QUOTA_PROJECT_HEADER, project_id);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, text_bytes = text.len(), "Google TTS request failed");
            SynthesisError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        if !status.is_success() {
            // A revoked or rotated token must not be reused until its expiry
            if status == reqwest::StatusCode::UNAUTHORIZED {
                tracing::warn!("Google TTS rejected the access token, dropping cached credential");
                self.credentials.invalidate().await;
            }

            let error = backend_error(status, &String::from_utf8_lossy(&body));
            tracing::error!(
                status = status.as_u16(),
                error = %error,
                text_bytes = text.len(),
                "Google TTS rejected chunk"
            );
            return Err(error);
        }

        decode_audio(&body)
    }
}
