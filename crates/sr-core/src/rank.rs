use serde::Serialize;
use sr_types::{CandidateRecord, ProbeResult};

/// Reachable candidates ordered by ascending latency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedSet {
    entries: Vec<ProbeResult>,
}

impl RankedSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeResult> {
        self.entries.iter()
    }

    /// Best `n` entries (or fewer).
    pub fn top(&self, n: usize) -> &[ProbeResult] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Records of the best `n` entries, in rank order.
    pub fn top_records(&self, n: usize) -> Vec<CandidateRecord> {
        self.top(n).iter().map(|r| r.record.clone()).collect()
    }

    pub fn into_vec(self) -> Vec<ProbeResult> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a RankedSet {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Drop failures and sort by latency. The sort is stable: equal latencies keep their
/// relative input order.
pub fn rank(results: impl IntoIterator<Item = ProbeResult>) -> RankedSet {
    let mut entries: Vec<ProbeResult> = results
        .into_iter()
        .filter(|r| r.outcome.is_reachable())
        .collect();
    entries.sort_by_key(|r| r.latency_ms().unwrap_or(u64::MAX));
    RankedSet { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_types::ProbeOutcome;

    fn ok(position: usize, latency_ms: u64) -> ProbeResult {
        let record = CandidateRecord::new(format!("h{position}"), 443, "m", "s", "");
        ProbeResult::new(position, record, ProbeOutcome::Reachable { latency_ms })
    }

    fn failed(position: usize) -> ProbeResult {
        let record = CandidateRecord::new(format!("h{position}"), 443, "m", "s", "");
        ProbeResult::new(position, record, ProbeOutcome::unreachable("refused"))
    }

    fn positions(set: &RankedSet) -> Vec<usize> {
        set.iter().map(|r| r.position).collect()
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank(vec![ok(0, 50), ok(1, 50), ok(2, 10)]);
        assert_eq!(positions(&ranked), vec![2, 0, 1]);
    }

    #[test]
    fn failures_are_excluded() {
        let ranked = rank(vec![failed(0), ok(1, 30), failed(2), ok(3, 5)]);
        assert_eq!(positions(&ranked), vec![3, 1]);
    }

    #[test]
    fn empty_and_all_failed_yield_empty_set() {
        assert!(rank(Vec::new()).is_empty());
        assert!(rank(vec![failed(0), failed(1)]).is_empty());
    }

    #[test]
    fn top_is_a_prefix() {
        let ranked = rank(vec![ok(0, 3), ok(1, 1), ok(2, 2), ok(3, 4)]);
        assert_eq!(
            ranked.top(3).iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 0]
        );
        assert_eq!(ranked.top(10).len(), 4);
        assert_eq!(ranked.top_records(1)[0].host, "h1");
        assert!(RankedSet::default().top(3).is_empty());
    }
}
