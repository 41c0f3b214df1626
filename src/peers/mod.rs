//! Enumeration of same-assignment peers.
//!
//! A [`PeerStream`] is lazy, finite and consumed once; implementations must not
//! buffer the whole corpus unless it is already in memory.

pub mod error;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;

pub use error::PeerListError;

use crate::constants::WorkId;

/// Another submission for the same assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub work_id: WorkId,
    pub owner_name: String,
}

impl Peer {
    pub fn new(work_id: WorkId, owner_name: impl Into<String>) -> Self {
        Self {
            work_id,
            owner_name: owner_name.into(),
        }
    }
}

/// Single-pass stream of peers; an `Err` item means the listing broke mid-way.
pub type PeerStream = BoxStream<'static, Result<Peer, PeerListError>>;

#[async_trait]
/// Lists works sharing an assignment label.
pub trait PeerSource: Send + Sync {
    /// Starts listing works of `assignment_name`, skipping `exclude`.
    async fn list_peers(
        &self,
        assignment_name: &str,
        exclude: WorkId,
    ) -> Result<PeerStream, PeerListError>;
}
