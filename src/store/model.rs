use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{WorkId, clamp_score};

pub type ReportId = i64;

/// Persisted outcome of one plagiarism check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub work_id: WorkId,
    #[serde(rename = "plagiat_score")]
    pub score: f64,
    #[serde(rename = "plagiat_sources")]
    pub sources: String,
    pub word_cloud_url: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub work_id: WorkId,
    pub score: f64,
    pub sources: String,
    pub word_cloud_url: Option<String>,
}

impl NewReport {
    /// Builds a report row; the score is clamped to `[0, 100]`.
    pub fn new(work_id: WorkId, score: f64, sources: impl Into<String>) -> Self {
        Self {
            work_id,
            score: clamp_score(score),
            sources: sources.into(),
            word_cloud_url: None,
        }
    }

    pub fn with_word_cloud_url(mut self, url: Option<String>) -> Self {
        self.word_cloud_url = url;
        self
    }
}
