//! Remote care-log store client
//!
//! Three calls against the shelter REST API: login, animal catalog, and
//! care-log registration. [`CareLogStore`] is the seam the batch registrar
//! works against; [`HttpCareLogStore`] is the reqwest implementation.
//!
//! Registration is sent at most once per call. Nothing here retries.

use crate::error::StoreError;
use crate::models::{CareLogRequest, CatalogEntry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelter_common::config::RemoteConfig;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const USER_AGENT: &str = concat!("shelter-ingest/", env!("CARGO_PKG_VERSION"));

/// Login material for one batch
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Short-lived bearer token for one batch
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Remote store operations used by a batch run
#[async_trait]
pub trait CareLogStore: Send + Sync {
    /// Exchange credentials for a session token
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, StoreError>;

    /// Full current animal list
    async fn fetch_catalog(&self, session: &SessionToken) -> Result<Vec<CatalogEntry>, StoreError>;

    /// Create one care log; returns the remote record id
    async fn register(
        &self,
        session: &SessionToken,
        request: &CareLogRequest<'_>,
    ) -> Result<u64, StoreError>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "token")]
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Wrapped { animals: Vec<CatalogEntry> },
    Bare(Vec<CatalogEntry>),
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: u64,
}

/// Rate limiter enforcing a minimum spacing between calls
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// reqwest-backed care-log store
pub struct HttpCareLogStore {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    login_path: String,
    animals_path: String,
    care_logs_path: String,
}

impl HttpCareLogStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(config.request_interval_ms)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
            animals_path: config.animals_path.clone(),
            care_logs_path: config.care_logs_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Best human-readable message from an error body
///
/// FastAPI-style `{"detail": ...}` and `{"message": ...}` bodies are
/// unwrapped; anything else is returned as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).cloned())
        })
        .map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.trim().to_string())
}

async fn rejection(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Rejected {
        status,
        message: error_message(&body),
    }
}

#[async_trait]
impl CareLogStore for HttpCareLogStore {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, StoreError> {
        let url = self.url(&self.login_path);
        tracing::debug!(url = %url, username = %credentials.username, "Authenticating");

        let response = self
            .http_client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| StoreError::Authentication(StoreError::from_transport(e).to_string()))?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(StoreError::Authentication(format!(
                "credentials rejected ({})",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(StoreError::Authentication(rejection(response).await.to_string()));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Authentication(format!("unreadable login response: {}", e)))?;

        Ok(SessionToken::new(login.access_token))
    }

    async fn fetch_catalog(&self, session: &SessionToken) -> Result<Vec<CatalogEntry>, StoreError> {
        let url = self.url(&self.animals_path);
        tracing::debug!(url = %url, "Fetching animal catalog");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(session.as_str())
            .send()
            .await
            .map_err(StoreError::from_transport)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(match catalog {
            CatalogResponse::Wrapped { animals } => animals,
            CatalogResponse::Bare(animals) => animals,
        })
    }

    async fn register(
        &self,
        session: &SessionToken,
        request: &CareLogRequest<'_>,
    ) -> Result<u64, StoreError> {
        self.rate_limiter.wait().await;

        let url = self.url(&self.care_logs_path);
        tracing::debug!(
            url = %url,
            animal_id = request.animal_id,
            log_date = %request.log_date,
            time_slot = %request.time_slot,
            "Registering care log"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(session.as_str())
            .json(request)
            .send()
            .await
            .map_err(StoreError::from_transport)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let created: CreatedResponse = response.json().await.map_err(|e| {
            StoreError::Parse(format!(
                "response unreadable; the record may have been created: {}",
                e
            ))
        })?;

        Ok(created.id)
    }
}
