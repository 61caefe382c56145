use super::error::CredentialError;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tokens are treated as expired this long before the backend says so
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Raw result of a token exchange
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Duration,
    pub project_id: Option<String>,
}

/// Source of fresh bearer tokens (e.g. an OAuth refresh-token exchange)
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<AccessToken, CredentialError>;
}

/// Point-in-time snapshot of the cached bearer credential
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: Instant,
    pub project_id: Option<String>,
}

struct SafetyMarginExpiry {
    margin: Duration,
}

impl Expiry<(), Credential> for SafetyMarginExpiry {
    fn expire_after_create(
        &self,
        _key: &(),
        value: &Credential,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(
            value
                .expires_at
                .saturating_duration_since(created_at)
                .saturating_sub(self.margin),
        )
    }
}

/// Caches one bearer credential and refreshes it on demand.
///
/// Concurrent callers that find the cache empty or expired share a single
/// in-flight refresh; failures are not cached.
pub struct CredentialCache {
    provider: Arc<dyn TokenProvider>,
    cache: Cache<(), Credential>,
}

impl CredentialCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_margin(provider, DEFAULT_SAFETY_MARGIN)
    }

    pub fn with_margin(provider: Arc<dyn TokenProvider>, margin: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .expire_after(SafetyMarginExpiry { margin })
            .build();

        Self { provider, cache }
    }

    /// Return the cached credential or refresh it
    pub async fn get_token(&self) -> Result<Credential, CredentialError> {
        self.cache
            .try_get_with((), self.refresh())
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drop the cached credential so the next caller refreshes
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }

    async fn refresh(&self) -> Result<Credential, CredentialError> {
        let started = Instant::now();
        let access = self.provider.fetch_token().await.map_err(|e| {
            tracing::error!(error = %e, "Credential refresh failed");
            e
        })?;

        tracing::info!(
            expires_in_secs = access.expires_in.as_secs(),
            has_project_id = access.project_id.is_some(),
            latency_ms = started.elapsed().as_millis(),
            "Credential refreshed"
        );

        Ok(Credential {
            token: access.token,
            expires_at: Instant::now() + access.expires_in,
            project_id: access.project_id,
        })
    }
}
