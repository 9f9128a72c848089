use crate::candidate::CandidateRecord;
use serde::{Deserialize, Serialize};

/// Outcome of a single reachability attempt. Exactly one of latency or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Handshake completed; wall-clock milliseconds from attempt start.
    Reachable { latency_ms: u64 },
    /// Refused, unresolvable, timed out or interrupted.
    Unreachable { reason: String },
}

impl ProbeOutcome {
    #[inline]
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            Self::Reachable { latency_ms } => Some(*latency_ms),
            Self::Unreachable { .. } => None,
        }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

/// A probed candidate.
///
/// `position` is the candidate's index in the probed sequence; the ranker uses it as the
/// tie-break so that result order never depends on which probe finished first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub position: usize,
    pub record: CandidateRecord,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(position: usize, record: CandidateRecord, outcome: ProbeOutcome) -> Self {
        Self {
            position,
            record,
            outcome,
        }
    }

    #[inline]
    pub fn latency_ms(&self) -> Option<u64> {
        self.outcome.latency_ms()
    }
}
