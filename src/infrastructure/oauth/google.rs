use crate::domain::credential::{AccessToken, CredentialError, TokenProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Contents of the stored client credentials file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub quota_project_id: Option<String>,
}

impl ClientSecrets {
    pub fn from_json(bytes: &[u8]) -> Result<Self, CredentialError> {
        let secrets: ClientSecrets = serde_json::from_slice(bytes)
            .map_err(|e| CredentialError::Secrets(format!("invalid credentials file: {}", e)))?;

        if secrets.client_id.is_empty()
            || secrets.client_secret.is_empty()
            || secrets.refresh_token.is_empty()
        {
            return Err(CredentialError::Secrets(
                "credentials file has empty fields".to_string(),
            ));
        }

        Ok(secrets)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Exchanges a stored refresh token for a short-lived Google access token
pub struct GoogleTokenProvider {
    credentials_path: PathBuf,
    token_url: String,
    http_client: reqwest::Client,
}

impl GoogleTokenProvider {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn load_secrets(&self) -> Result<ClientSecrets, CredentialError> {
        let bytes = tokio::fs::read(&self.credentials_path).await.map_err(|e| {
            CredentialError::Secrets(format!(
                "cannot read {}: {}",
                self.credentials_path.display(),
                e
            ))
        })?;
        ClientSecrets::from_json(&bytes)
    }
}

#[async_trait]
impl TokenProvider for GoogleTokenProvider {
    async fn fetch_token(&self) -> Result<AccessToken, CredentialError> {
        let secrets = self.load_secrets().await?;

        let params = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", secrets.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| CredentialError::Exchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CredentialError::Exchange(format!(
                "status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let token = response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| CredentialError::Exchange(format!("invalid token response: {}", e)))?;

        Ok(AccessToken {
            token: token.access_token,
            expires_in: Duration::from_secs(token.expires_in),
            project_id: secrets.quota_project_id,
        })
    }
}
