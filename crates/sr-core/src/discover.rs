//! End-to-end discovery run.

use crate::dedupe::dedupe;
use crate::locale::{filter_by_locale, LocaleTable};
use crate::probe::{probe_all, ProbePolicy, Prober};
use crate::rank::{rank, RankedSet};
use crate::source::CandidateSource;
use serde::Serialize;
use sr_types::{CandidateRecord, FetchError};
use std::sync::Arc;
use std::time::Instant;

/// Counters and ranking for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    /// Valid records returned by the source.
    pub fetched: usize,
    /// Records left after the locale filter.
    pub matched: usize,
    /// Records left after dedupe.
    pub unique: usize,
    /// Records actually probed (`min(unique, bound)`).
    pub tested: usize,
    /// Probes that succeeded.
    pub working_count: usize,
    pub ranked: RankedSet,
}

impl DiscoveryReport {
    /// Nothing survived the locale filter.
    pub fn no_match(&self) -> bool {
        self.matched == 0
    }

    /// Something matched but nothing answered.
    pub fn no_working(&self) -> bool {
        self.matched > 0 && self.ranked.is_empty()
    }
}

pub struct Discovery {
    source: Arc<dyn CandidateSource>,
    prober: Arc<dyn Prober>,
    locales: LocaleTable,
    policy: ProbePolicy,
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("locales", &self.locales.codes().count())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Discovery {
    pub fn new(source: Arc<dyn CandidateSource>, prober: Arc<dyn Prober>) -> Self {
        Self {
            source,
            prober,
            locales: LocaleTable::default(),
            policy: ProbePolicy::default(),
        }
    }

    pub fn with_locales(mut self, locales: LocaleTable) -> Self {
        self.locales = locales;
        self
    }

    pub fn with_policy(mut self, policy: ProbePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ProbePolicy {
        &self.policy
    }

    pub fn locales(&self) -> &LocaleTable {
        &self.locales
    }

    /// Raw candidate list from the source.
    pub async fn candidates(&self) -> Result<Vec<CandidateRecord>, FetchError> {
        self.source.fetch_candidates().await
    }

    /// Fetch, filter, dedupe, probe and rank.
    ///
    /// # Errors
    /// Only a failed fetch is an error; empty outcomes are reported through the counters.
    pub async fn discover(&self, locale: &str) -> Result<DiscoveryReport, FetchError> {
        let candidates = match self.candidates().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, class = %e.class(), "candidate fetch failed");
                return Err(e);
            }
        };
        Ok(self.run(candidates, locale).await)
    }

    /// Everything after the fetch.
    pub async fn run(&self, candidates: Vec<CandidateRecord>, locale: &str) -> DiscoveryReport {
        let started = Instant::now();
        let fetched = candidates.len();

        let matched = filter_by_locale(&candidates, locale, &self.locales);
        let matched_count = matched.len();
        tracing::info!(fetched, matched = matched_count, locale, "candidates filtered");
        if matched.is_empty() {
            return DiscoveryReport {
                fetched,
                ..DiscoveryReport::default()
            };
        }

        let unique = dedupe(matched);
        let unique_count = unique.len();
        let results = probe_all(Arc::clone(&self.prober), &unique, &self.policy).await;
        let tested = results.len();
        let ranked = rank(results);

        tracing::info!(
            unique = unique_count,
            tested,
            working = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "probe round finished"
        );

        DiscoveryReport {
            fetched,
            matched: matched_count,
            unique: unique_count,
            tested,
            working_count: ranked.len(),
            ranked,
        }
    }
}
