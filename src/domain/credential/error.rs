#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("Missing or invalid credentials: {0}")]
    Secrets(String),
    #[error("Failed to refresh token: {0}")]
    Exchange(String),
}
