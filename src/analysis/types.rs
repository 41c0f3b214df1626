use std::fmt;

use serde::Serialize;

use crate::constants::WorkId;

/// Separator between matched peers in the sources descriptor.
pub const MATCH_SEPARATOR: &str = "; ";

pub const NO_MATCH_FOUND: &str = "no match found";
pub const POSSIBLE_EXTERNAL_MATCH: &str = "possible external match";
pub const METADATA_UNAVAILABLE: &str = "comparison skipped: metadata unavailable";
pub const PEER_LIST_UNAVAILABLE: &str = "comparison skipped: peer list unavailable";

/// A peer whose score crossed the match threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerMatch {
    pub work_id: WorkId,
    pub owner_name: String,
    pub score: f64,
}

impl fmt::Display for PeerMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (work #{}): {:.2}%",
            self.owner_name, self.work_id, self.score
        )
    }
}

/// Why a comparison was skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Degradation {
    MetadataUnavailable,
    PeerListUnavailable,
}

impl Degradation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Degradation::MetadataUnavailable => METADATA_UNAVAILABLE,
            Degradation::PeerListUnavailable => PEER_LIST_UNAVAILABLE,
        }
    }
}

/// Three-way outcome of a comparison: matched, unmatched, or degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// At least one peer scored above the match threshold.
    Matched(Vec<PeerMatch>),
    /// Best score below the low-confidence threshold.
    NoMatch,
    /// Best score in `[low-confidence, match]` without a listed peer.
    PossibleExternalMatch,
    /// Peers were never compared.
    Degraded(Degradation),
}

/// Aggregated result of one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub score: f64,
    pub outcome: Outcome,
    pub compared_peers: usize,
    pub skipped_peers: usize,
}

impl Verdict {
    /// Zero-confidence verdict for a comparison that could not run.
    pub fn degraded(reason: Degradation) -> Self {
        Self {
            score: 0.0,
            outcome: Outcome::Degraded(reason),
            compared_peers: 0,
            skipped_peers: 0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, Outcome::Degraded(_))
    }

    /// Peers listed as matches (empty unless [`Outcome::Matched`]).
    pub fn matches(&self) -> &[PeerMatch] {
        match &self.outcome {
            Outcome::Matched(matches) => matches,
            _ => &[],
        }
    }

    /// Flattens the verdict into the free-text `plagiat_sources` column.
    pub fn sources_descriptor(&self) -> String {
        let mut out = match &self.outcome {
            Outcome::Matched(matches) => matches
                .iter()
                .map(PeerMatch::to_string)
                .collect::<Vec<_>>()
                .join(MATCH_SEPARATOR),
            Outcome::NoMatch => NO_MATCH_FOUND.to_string(),
            Outcome::PossibleExternalMatch => POSSIBLE_EXTERNAL_MATCH.to_string(),
            Outcome::Degraded(reason) => reason.as_str().to_string(),
        };

        if self.skipped_peers > 0 {
            out.push_str(&format!(" [{} peer(s) skipped]", self.skipped_peers));
        }

        out
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sources_descriptor())
    }
}
