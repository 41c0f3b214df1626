use thiserror::Error;

#[derive(Debug, Error)]
/// Peer listing failures. Never fatal to a check.
pub enum PeerListError {
    /// The relational store could not run the query.
    #[error("peer query failed: {message}")]
    QueryFailed { message: String },

    /// A returned row did not have the expected shape.
    #[error("malformed peer row: {message}")]
    MalformedRow { message: String },
}
