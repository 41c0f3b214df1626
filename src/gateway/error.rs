use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::store::ReportId;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("report {0} not found")]
    ReportNotFound(ReportId),

    #[error("database error: {0}")]
    StoreFailure(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<AnalysisError> for GatewayError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Content(e) => GatewayError::ContentUnavailable(e.to_string()),
            AnalysisError::Store(e) => GatewayError::StoreFailure(e.to_string()),
        }
    }
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ContentUnavailable(_) | GatewayError::StoreFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
