use sr_types::{CandidateRecord, EndpointKey};
use std::collections::HashSet;

/// Drop every candidate whose `host:port` was already seen. First occurrence wins and
/// relative order is preserved.
pub fn dedupe(candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut seen: HashSet<EndpointKey> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.endpoint_key()))
        .collect()
}
