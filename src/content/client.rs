use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::error::ContentError;
use super::model::WorkMetadata;
use crate::constants::{
    DEFAULT_HTTP_TIMEOUT, DOWNLOAD_BACKOFF_STEP, DOWNLOAD_MAX_ATTEMPTS, WorkId,
};

#[async_trait]
/// Read access to submitted works held by the storing service.
pub trait ContentSource: Send + Sync {
    /// Downloads the plain-text body of `work_id`.
    async fn fetch_body(&self, work_id: WorkId) -> Result<String, ContentError>;

    /// Fetches owner and assignment of `work_id`.
    async fn fetch_metadata(&self, work_id: WorkId) -> Result<WorkMetadata, ContentError>;
}

/// Attempt count, backoff step and per-attempt timeout for body downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DOWNLOAD_MAX_ATTEMPTS,
            backoff_step: DOWNLOAD_BACKOFF_STEP,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Wait after failed attempt `attempt` (1-based) before the next one.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

#[derive(Clone)]
/// reqwest-backed client for `GET /get/{id}` and `GET /download/{id}`.
pub struct HttpContentClient {
    http: HttpClient,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpContentClient {
    /// Creates a client for the storing service at `base_url`.
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: HttpClient::builder()
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn metadata_url(&self, work_id: WorkId) -> String {
        format!("{}/get/{}", self.base_url, work_id)
    }

    pub(crate) fn download_url(&self, work_id: WorkId) -> String {
        format!("{}/download/{}", self.base_url, work_id)
    }

    async fn download_once(&self, url: &str) -> Result<String, String> {
        let resp = self
            .http
            .get(url)
            .timeout(self.retry.timeout)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("storing service returned {}: {}", status, body.trim()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl ContentSource for HttpContentClient {
    async fn fetch_body(&self, work_id: WorkId) -> Result<String, ContentError> {
        let url = self.download_url(work_id);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.download_once(&url).await {
                Ok(body) => {
                    debug!(work_id, attempt, bytes = body.len(), "Downloaded work body");
                    return Ok(body);
                }
                Err(e) => {
                    warn!(work_id, attempt, max_attempts, error = %e, "Work download failed");
                    last_error = e;
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.retry.backoff_for(attempt)).await;
            }
        }

        Err(ContentError::ContentUnavailable {
            work_id,
            attempts: max_attempts,
            last_error,
        })
    }

    async fn fetch_metadata(&self, work_id: WorkId) -> Result<WorkMetadata, ContentError> {
        let unavailable = |message: String| ContentError::MetadataUnavailable { work_id, message };

        let resp = self
            .http
            .get(self.metadata_url(work_id))
            .timeout(self.retry.timeout)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(unavailable(format!(
                "storing service returned {}: {}",
                status,
                body.trim()
            )));
        }

        resp.json::<WorkMetadata>()
            .await
            .map_err(|e| unavailable(format!("failed to decode metadata: {}", e)))
    }
}
