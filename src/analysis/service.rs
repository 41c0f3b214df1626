use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::error::AnalysisError;
use super::orchestrator::ComparisonOrchestrator;
use crate::artifact::{ArtifactRenderer, excerpt};
use crate::constants::WorkId;
use crate::content::ContentSource;
use crate::peers::PeerSource;
use crate::store::{NewReport, Report, ReportId, ReportStore, StoreError};

/// Whether a check produced a new report or returned an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Created,
    Existing,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: Report,
    pub status: CheckStatus,
}

impl CheckOutcome {
    fn created(report: Report) -> Self {
        Self {
            report,
            status: CheckStatus::Created,
        }
    }

    fn existing(report: Report) -> Self {
        Self {
            report,
            status: CheckStatus::Existing,
        }
    }
}

/// Idempotent entry point: one report per work, computed at most once.
pub struct CheckService {
    orchestrator: ComparisonOrchestrator,
    store: Arc<dyn ReportStore>,
    renderer: Arc<dyn ArtifactRenderer>,
}

impl CheckService {
    pub fn new(
        content: Arc<dyn ContentSource>,
        peers: Arc<dyn PeerSource>,
        store: Arc<dyn ReportStore>,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Self {
        Self {
            orchestrator: ComparisonOrchestrator::new(content, peers),
            store,
            renderer,
        }
    }

    /// Returns the existing report of `work_id` or runs the comparison and persists one.
    #[instrument(skip(self))]
    pub async fn check(&self, work_id: WorkId) -> Result<CheckOutcome, AnalysisError> {
        if let Some(existing) = self.store.find_by_work(work_id).await? {
            info!(report_id = existing.id, "Report already exists");
            return Ok(CheckOutcome::existing(existing));
        }

        let comparison = self.orchestrator.compare(work_id).await?;
        let verdict = &comparison.verdict;
        info!(
            score = verdict.score,
            compared = verdict.compared_peers,
            skipped = verdict.skipped_peers,
            degraded = verdict.is_degraded(),
            "Comparison finished"
        );

        let word_cloud_url = self
            .render_word_cloud(work_id, &comparison.candidate_text)
            .await;
        let report = NewReport::new(work_id, verdict.score, verdict.sources_descriptor())
            .with_word_cloud_url(word_cloud_url);

        match self.store.create(report).await {
            Ok(report) => {
                info!(report_id = report.id, "Report created");
                Ok(CheckOutcome::created(report))
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("Concurrent check persisted first, returning its report");
                let existing = self.store.find_by_work(work_id).await?.ok_or_else(|| {
                    StoreError::QueryFailed {
                        message: format!("report for work {} missing after conflict", work_id),
                    }
                })?;
                Ok(CheckOutcome::existing(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_report(&self, id: ReportId) -> Result<Option<Report>, AnalysisError> {
        Ok(self.store.find_by_id(id).await?)
    }

    async fn render_word_cloud(&self, work_id: WorkId, text: &str) -> Option<String> {
        match self.renderer.render(excerpt(text)).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(work_id, error = %e, "Word cloud unavailable, storing report without it");
                None
            }
        }
    }
}
