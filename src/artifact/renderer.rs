use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};
use tracing::debug;

use super::error::ArtifactError;
use crate::constants::{DEFAULT_HTTP_TIMEOUT, WORD_CLOUD_MAX_CHARS};

/// Returns at most the first [`WORD_CLOUD_MAX_CHARS`] characters of `text`.
pub fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(WORD_CLOUD_MAX_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[async_trait]
/// Produces a fetchable reference to a rendered artifact for `text`.
pub trait ArtifactRenderer: Send + Sync {
    async fn render(&self, text: &str) -> Result<String, ArtifactError>;
}

/// QuickChart-compatible word cloud client. The request URL itself is the
/// image reference once the service has answered it successfully.
#[derive(Clone)]
pub struct WordCloudRenderer {
    http: HttpClient,
    endpoint: String,
    timeout: Duration,
}

impl WordCloudRenderer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: HttpClient::builder()
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            endpoint: endpoint.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the image URL for `text` (already truncated by the caller).
    pub fn image_url(&self, text: &str) -> Result<Url, ArtifactError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("text", text),
                ("format", "png"),
                ("width", "800"),
                ("height", "600"),
                ("fontScale", "15"),
                ("scale", "linear"),
                ("removeStopwords", "true"),
            ],
        )
        .map_err(|e| ArtifactError::InvalidEndpoint {
            url: self.endpoint.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ArtifactRenderer for WordCloudRenderer {
    async fn render(&self, text: &str) -> Result<String, ArtifactError> {
        if text.trim().is_empty() {
            return Err(ArtifactError::EmptyText);
        }

        let url = self.image_url(text)?;
        let resp = self
            .http
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ArtifactError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ArtifactError::BadStatus {
                status: resp.status().as_u16(),
            });
        }

        debug!(url_len = url.as_str().len(), "Word cloud rendered");
        Ok(url.into())
    }
}

#[cfg(any(test, feature = "mock"))]
/// Renderer that records its inputs and optionally fails.
#[derive(Default)]
pub struct MockRenderer {
    fail: std::sync::atomic::AtomicBool,
    inputs: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "mock"))]
impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let renderer = Self::default();
        renderer.set_failing(true);
        renderer
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Texts passed to `render`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl ArtifactRenderer for MockRenderer {
    async fn render(&self, text: &str) -> Result<String, ArtifactError> {
        let call = {
            let mut inputs = self.inputs.lock();
            inputs.push(text.to_string());
            inputs.len()
        };

        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ArtifactError::BadStatus { status: 503 });
        }

        Ok(format!("mock://wordcloud/{}.png", call))
    }
}
