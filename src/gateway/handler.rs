use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::analysis::CheckStatus;
use crate::constants::WorkId;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::store::{Report, ReportId};

/// Body of `POST /check/{work_id}`.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub status: &'static str,
    pub id: ReportId,
    pub work_id: WorkId,
    pub plagiat_score: f64,
    pub outcome: CheckStatus,
}

/// Parses a positive integer path segment.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, GatewayError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(GatewayError::InvalidInput(format!(
            "invalid {}: '{}'",
            what, raw
        ))),
    }
}

#[instrument(skip(state))]
pub async fn check_handler(
    State(state): State<HandlerState>,
    Path(raw_work_id): Path<String>,
) -> Result<Json<CheckResponse>, GatewayError> {
    let work_id = parse_id(&raw_work_id, "work_id")?;
    let outcome = state.service.check(work_id).await?;

    Ok(Json(CheckResponse {
        status: "checked",
        id: outcome.report.id,
        work_id: outcome.report.work_id,
        plagiat_score: outcome.report.score,
        outcome: outcome.status,
    }))
}

#[instrument(skip(state))]
pub async fn get_report_handler(
    State(state): State<HandlerState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Report>, GatewayError> {
    let id = parse_id(&raw_id, "report id")?;

    state
        .service
        .get_report(id)
        .await?
        .map(Json)
        .ok_or(GatewayError::ReportNotFound(id))
}
