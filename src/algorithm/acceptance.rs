//! Acceptance policies applied to proposed matches before commit

use crate::analysis::pair::PatchPair;

/// Outcome of reviewing a proposed match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Commit the proposed source patch
    Accept,
    /// Discard the proposal; the driver retries or skips the vertex
    Reject,
}

/// Reviews a proposed `(source, target)` match
pub trait AcceptancePolicy {
    /// Accept or reject the proposal
    fn decide(&mut self, pair: &PatchPair) -> Decision;
}

/// Accept every proposal
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAccept;

impl AcceptancePolicy for AlwaysAccept {
    fn decide(&mut self, _pair: &PatchPair) -> Decision {
        Decision::Accept
    }
}

/// Reject every proposal, for pipelines where matches are never applied automatically
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAccept;

impl AcceptancePolicy for NeverAccept {
    fn decide(&mut self, _pair: &PatchPair) -> Decision {
        Decision::Reject
    }
}

/// Accept proposals whose combined score does not exceed a limit
///
/// Pairs that carry no score are accepted.
#[derive(Debug, Clone, Copy)]
pub struct DistanceThreshold {
    /// Largest acceptable total score
    pub max_score: f32,
}

impl AcceptancePolicy for DistanceThreshold {
    fn decide(&mut self, pair: &PatchPair) -> Decision {
        match pair.total_score() {
            Some(score) if score > self.max_score => Decision::Reject,
            _ => Decision::Accept,
        }
    }
}

impl<F> AcceptancePolicy for F
where
    F: FnMut(&PatchPair) -> Decision,
{
    fn decide(&mut self, pair: &PatchPair) -> Decision {
        self(pair)
    }
}
