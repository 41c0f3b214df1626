use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, instrument, warn};

use super::types::{Degradation, Outcome, PeerMatch, Verdict};
use crate::constants::{LOW_CONFIDENCE_THRESHOLD, MATCH_THRESHOLD, WorkId, clamp_score};
use crate::content::{ContentError, ContentSource};
use crate::peers::{Peer, PeerSource};
use crate::similarity::CandidateProfile;

/// Candidate text plus the verdict computed for it.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub work_id: WorkId,
    pub candidate_text: String,
    pub verdict: Verdict,
}

/// Running aggregate over compared peers.
#[derive(Debug, Default)]
pub struct PeerTally {
    max_score: f64,
    matches: Vec<PeerMatch>,
    compared: usize,
    skipped: usize,
}

impl PeerTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one successful comparison into the aggregate.
    pub fn record(&mut self, peer: Peer, score: f64) {
        self.compared += 1;
        if score > self.max_score {
            self.max_score = score;
        }
        if score > MATCH_THRESHOLD {
            self.matches.push(PeerMatch {
                work_id: peer.work_id,
                owner_name: peer.owner_name,
                score,
            });
        }
    }

    /// Counts a peer whose body could not be downloaded.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn finish(self) -> Verdict {
        let outcome = if !self.matches.is_empty() {
            Outcome::Matched(self.matches)
        } else if self.max_score < LOW_CONFIDENCE_THRESHOLD {
            Outcome::NoMatch
        } else {
            Outcome::PossibleExternalMatch
        };

        Verdict {
            score: clamp_score(self.max_score),
            outcome,
            compared_peers: self.compared,
            skipped_peers: self.skipped,
        }
    }
}

/// Fetches a candidate, walks its peers once, and aggregates a [`Verdict`].
///
/// Only an unobtainable candidate body is an error. Metadata or peer-listing
/// failures yield a degraded verdict; individual peer download failures are
/// counted and skipped. Peers are compared one at a time.
#[derive(Clone)]
pub struct ComparisonOrchestrator {
    content: Arc<dyn ContentSource>,
    peers: Arc<dyn PeerSource>,
}

impl ComparisonOrchestrator {
    pub fn new(content: Arc<dyn ContentSource>, peers: Arc<dyn PeerSource>) -> Self {
        Self { content, peers }
    }

    #[instrument(skip(self))]
    pub async fn compare(&self, work_id: WorkId) -> Result<Comparison, ContentError> {
        let candidate_text = self.content.fetch_body(work_id).await?;
        let verdict = self.compare_candidate(work_id, &candidate_text).await;

        Ok(Comparison {
            work_id,
            candidate_text,
            verdict,
        })
    }

    async fn compare_candidate(&self, work_id: WorkId, candidate_text: &str) -> Verdict {
        let metadata = match self.content.fetch_metadata(work_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(work_id, error = %e, "Metadata unavailable, skipping peer comparison");
                return Verdict::degraded(Degradation::MetadataUnavailable);
            }
        };

        let mut peers = match self
            .peers
            .list_peers(&metadata.assignment_name, work_id)
            .await
        {
            Ok(peers) => peers,
            Err(e) => {
                warn!(work_id, error = %e, "Peer list unavailable, skipping peer comparison");
                return Verdict::degraded(Degradation::PeerListUnavailable);
            }
        };

        let profile = CandidateProfile::new(candidate_text);
        let mut tally = PeerTally::new();

        while let Some(item) = peers.next().await {
            let peer = match item {
                Ok(peer) => peer,
                Err(e) => {
                    warn!(work_id, error = %e, "Peer listing broke mid-stream");
                    return Verdict::degraded(Degradation::PeerListUnavailable);
                }
            };

            match self.content.fetch_body(peer.work_id).await {
                Ok(body) => {
                    let score = profile.score_against(&body);
                    debug!(work_id, peer_id = peer.work_id, score, "Peer compared");
                    tally.record(peer, score);
                }
                Err(e) => {
                    warn!(work_id, peer_id = peer.work_id, error = %e, "Skipping unreachable peer");
                    tally.skip();
                }
            }
        }

        tally.finish()
    }
}
