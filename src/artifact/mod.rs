//! Word cloud rendering for report artifacts.
//!
//! Rendering never blocks a report: callers log the error and store `None`.

pub mod error;
pub mod renderer;


pub use error::ArtifactError;
#[cfg(any(test, feature = "mock"))]
pub use renderer::MockRenderer;
pub use renderer::{ArtifactRenderer, WordCloudRenderer, excerpt};
