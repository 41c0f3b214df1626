//! File analysis service library (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`CheckService`] - idempotent check entry point (lookup, compare, persist)
//! - [`ComparisonOrchestrator`], [`Verdict`], [`Outcome`] - comparison state machine and its result
//! - [`CandidateProfile`], [`similarity::score`] - token-overlap scoring
//!
//! ## Collaborators
//! - [`ContentSource`], [`HttpContentClient`], [`RetryPolicy`] - storing service client
//! - [`PeerSource`], [`PeerStream`] - same-assignment peer listing
//! - [`ReportStore`], [`PgStore`] - report persistence
//! - [`ArtifactRenderer`], [`WordCloudRenderer`] - word cloud references
//!
//! ## Test/Mock Support
//! In-memory implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod artifact;
pub mod config;
pub mod constants;
pub mod content;
pub mod gateway;
pub mod peers;
pub mod similarity;
pub mod store;

pub use analysis::{
    AnalysisError, CheckOutcome, CheckService, CheckStatus, Comparison, ComparisonOrchestrator,
    Degradation, Outcome, PeerMatch, Verdict,
};
#[cfg(any(test, feature = "mock"))]
pub use artifact::MockRenderer;
pub use artifact::{ArtifactError, ArtifactRenderer, WordCloudRenderer};
pub use config::{Config, ConfigError};
pub use constants::{LOW_CONFIDENCE_THRESHOLD, MATCH_THRESHOLD, WorkId};
#[cfg(any(test, feature = "mock"))]
pub use content::MockContentSource;
pub use content::{ContentError, ContentSource, HttpContentClient, RetryPolicy, WorkMetadata};
pub use gateway::{HandlerState, create_router_with_state};
pub use peers::{Peer, PeerListError, PeerSource, PeerStream};
pub use similarity::CandidateProfile;
#[cfg(any(test, feature = "mock"))]
pub use store::MemoryStore;
pub use store::{NewReport, PgStore, Report, ReportId, ReportStore, StoreError};
