//! Cross-cutting, shared constants.
//!
//! Thresholds and retry bounds used by the comparison pipeline. Runtime overrides
//! (timeouts, service URLs) live in [`Config`](crate::config::Config).

use std::time::Duration;

/// A peer is listed as a match only when its score is strictly above this value.
pub const MATCH_THRESHOLD: f64 = 50.0;

/// Below this aggregate score (and with no match) the verdict is "no match found".
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 10.0;

/// Upper bound of every similarity score.
pub const MAX_SCORE: f64 = 100.0;

/// Total attempts for a document body download (first try included).
pub const DOWNLOAD_MAX_ATTEMPTS: u32 = 3;

/// Linear backoff step: attempt `i` waits `i * step` before attempt `i + 1`.
pub const DOWNLOAD_BACKOFF_STEP: Duration = Duration::from_millis(200);

/// Per-call bound on every outbound request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// The word cloud is rendered from at most this many leading characters.
pub const WORD_CLOUD_MAX_CHARS: usize = 3000;

/// Type of work (document) identifiers.
pub type WorkId = i64;

/// Clamps a score into `[0, MAX_SCORE]`.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}
