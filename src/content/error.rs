use thiserror::Error;

use crate::constants::WorkId;

#[derive(Debug, Error)]
/// Errors returned by the remote content client.
pub enum ContentError {
    /// Body could not be downloaded after every attempt.
    #[error("content of work {work_id} unavailable after {attempts} attempt(s): {last_error}")]
    ContentUnavailable {
        /// Work identifier.
        work_id: WorkId,
        /// Attempts made.
        attempts: u32,
        /// Error observed on the final attempt.
        last_error: String,
    },

    /// Metadata request failed or returned an undecodable payload.
    #[error("metadata of work {work_id} unavailable: {message}")]
    MetadataUnavailable {
        /// Work identifier.
        work_id: WorkId,
        /// Error message.
        message: String,
    },
}

impl ContentError {
    pub fn work_id(&self) -> WorkId {
        match self {
            ContentError::ContentUnavailable { work_id, .. }
            | ContentError::MetadataUnavailable { work_id, .. } => *work_id,
        }
    }
}
