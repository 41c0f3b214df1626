use std::collections::HashSet;

use crate::constants::MAX_SCORE;

/// Lower-cases `text` and splits it on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Scores `other` against `candidate` on a `0..=100` scale.
///
/// Equivalent to `CandidateProfile::new(candidate).score_against(other)`.
pub fn score(candidate: &str, other: &str) -> f64 {
    CandidateProfile::new(candidate).score_against(other)
}

/// Pre-tokenized candidate text, reused across every peer of one check.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    vocabulary: HashSet<String>,
    token_count: usize,
}

impl CandidateProfile {
    pub fn new(candidate: &str) -> Self {
        let tokens = tokenize(candidate);
        let token_count = tokens.len();
        Self {
            vocabulary: tokens.into_iter().collect(),
            token_count,
        }
    }

    /// Number of tokens in the candidate, repeats included.
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    /// `matching / token_count * 100`, clamped to 100; 0 when either side is empty.
    pub fn score_against(&self, other: &str) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let lowered = other.to_lowercase();
        let matching = lowered
            .split_whitespace()
            .filter(|token| self.vocabulary.contains(*token))
            .count();

        if matching == 0 {
            return 0.0;
        }

        (matching as f64 * MAX_SCORE / self.token_count as f64).min(MAX_SCORE)
    }
}
