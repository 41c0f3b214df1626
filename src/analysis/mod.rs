//! Cross-document comparison pipeline.
//!
//! [`CheckService::check`] is the idempotency guard around
//! [`ComparisonOrchestrator`], which walks the states
//! `FetchCandidate -> FetchMetadata -> EnumeratePeers -> ComparePeer* -> Aggregate`.
//! The resulting [`Verdict`] stays a tagged value until it is flattened into the
//! `plagiat_sources` column.

pub mod error;
pub mod orchestrator;
pub mod service;
pub mod types;


pub use error::AnalysisError;
pub use orchestrator::{Comparison, ComparisonOrchestrator, PeerTally};
pub use service::{CheckOutcome, CheckService, CheckStatus};
pub use types::{
    Degradation, METADATA_UNAVAILABLE, NO_MATCH_FOUND, Outcome, PEER_LIST_UNAVAILABLE,
    POSSIBLE_EXTERNAL_MATCH, PeerMatch, Verdict,
};
