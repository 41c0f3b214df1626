//! Remote content client for the file storing service.
//!
//! Bodies are mandatory for a check and are downloaded with bounded linear
//! retry; metadata is a single best-effort attempt.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{ContentSource, HttpContentClient, RetryPolicy};
pub use error::ContentError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockContentSource;
pub use model::WorkMetadata;
