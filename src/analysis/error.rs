use thiserror::Error;

use crate::content::ContentError;
use crate::store::StoreError;

#[derive(Debug, Error)]
/// Fatal check failures. Everything else degrades into the verdict.
pub enum AnalysisError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("report store failure: {0}")]
    Store(#[from] StoreError),
}
