use crate::domain::tts::AudioFormat;
use crate::infrastructure::repositories::metadata_repository::{
    DEFAULT_METADATA_MODEL, OPENROUTER_API_BASE,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Root directory for generated audio and image blobs
    pub data_dir: PathBuf,
    // Google TTS
    pub google_credentials_path: PathBuf,
    pub tts_language_code: String,
    pub tts_voice_name: String,
    pub tts_audio_encoding: AudioFormat,
    pub tts_speaking_rate: f64,
    pub tts_max_chunk_bytes: usize,
    pub tts_max_concurrency: usize,
    // Metadata extraction (OpenAI-compatible chat API)
    pub openrouter_api_key: String,
    pub openrouter_api_base: String,
    pub metadata_model: String,
    // Cover art
    pub image_api_url: String,
    pub image_api_token: String,
    // PDF search, disabled when unset
    pub exa_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "8080").parse()?,
            environment: match var_or("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var_or("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            data_dir: var_or("DATA_DIR", "./data").into(),
            google_credentials_path: var_or("GOOGLE_CREDENTIALS_PATH", "./google-credentials.json")
                .into(),
            tts_language_code: var_or("TTS_LANGUAGE_CODE", "en-US"),
            tts_voice_name: var_or("TTS_VOICE_NAME", "en-US-Chirp3-HD-Achernar"),
            tts_audio_encoding: var_or("TTS_AUDIO_ENCODING", "MP3").parse::<AudioFormat>()?,
            tts_speaking_rate: var_or("TTS_SPEAKING_RATE", "1.0").parse()?,
            tts_max_chunk_bytes: var_or("TTS_MAX_CHUNK_BYTES", "4000").parse()?,
            tts_max_concurrency: var_or("TTS_MAX_CONCURRENCY", "5").parse()?,
            openrouter_api_key: env::var("OPENROUTER_API_KEY")?,
            openrouter_api_base: var_or("OPENROUTER_API_BASE", OPENROUTER_API_BASE),
            metadata_model: var_or("METADATA_MODEL", DEFAULT_METADATA_MODEL),
            image_api_url: var_or(
                "IMAGE_API_URL",
                "https://free-image-generation.alextheastro.workers.dev/",
            ),
            image_api_token: env::var("IMAGE_API_TOKEN")?,
            exa_api_key: env::var("EXA_API_KEY").ok().filter(|key| !key.is_empty()),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
