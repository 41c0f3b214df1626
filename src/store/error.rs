use thiserror::Error;

use crate::constants::WorkId;

#[derive(Debug, Error)]
/// Errors returned by report stores.
pub enum StoreError {
    /// Could not connect to the database.
    #[error("failed to connect to database: {message}")]
    ConnectionFailed { message: String },

    /// Statement failed or returned an unexpected row.
    #[error("database query failed: {message}")]
    QueryFailed { message: String },

    /// A report for this work already exists.
    #[error("report for work {work_id} already exists")]
    Conflict { work_id: WorkId },
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::QueryFailed {
            message: e.to_string(),
        }
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        StoreError::ConnectionFailed {
            message: e.to_string(),
        }
    }
}
