use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid word cloud endpoint '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("word cloud request failed: {0}")]
    RequestFailed(String),

    #[error("word cloud service returned {status}")]
    BadStatus { status: u16 },

    #[error("nothing to render")]
    EmptyText,
}
