//! Last-fetch cache.
//!
//! Holds the most recent successful candidate list for `ttl`. Lookups past the TTL miss,
//! failures are never stored, and `invalidate` drops the entry immediately. A TTL of zero
//! disables the cache. The cache is an explicit object handed to [`CachedSource`]; nothing
//! here is process-global.

use crate::source::CandidateSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use sr_types::{CandidateRecord, FetchError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time-to-live for a cached fetch.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    records: Arc<Vec<CandidateRecord>>,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self) -> Option<Arc<Vec<CandidateRecord>>> {
        self.get_at(Instant::now())
    }

    fn get_at(&self, now: Instant) -> Option<Arc<Vec<CandidateRecord>>> {
        let fresh = self.fresh_at(now);
        let counter = if fresh.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        fresh
    }

    /// Like `get`, without touching the hit/miss counters.
    pub fn peek(&self) -> Option<Arc<Vec<CandidateRecord>>> {
        self.fresh_at(Instant::now())
    }

    fn fresh_at(&self, now: Instant) -> Option<Arc<Vec<CandidateRecord>>> {
        let mut slot = self.slot.lock();
        let fresh = slot
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.records));
        if fresh.is_none() {
            // expired entries are dropped eagerly
            *slot = None;
        }
        fresh
    }

    pub fn put(&self, records: Vec<CandidateRecord>) {
        if !self.is_enabled() {
            return;
        }
        *self.slot.lock() = Some(CacheEntry {
            records: Arc::new(records),
            stored_at: Instant::now(),
        });
    }

    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }

    /// `(hits, misses)`
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

/// Serves fetches from a [`FetchCache`] and falls back to the wrapped source on a miss.
///
/// Refills are single-flight: callers that miss together wait for one upstream fetch.
pub struct CachedSource<S> {
    inner: S,
    cache: Arc<FetchCache>,
    refill: tokio::sync::Mutex<()>,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, cache: Arc<FetchCache>) -> Self {
        Self {
            inner,
            cache,
            refill: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }
}

#[async_trait]
impl<S: CandidateSource> CandidateSource for CachedSource<S> {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FetchError> {
        if let Some(records) = self.cache.get() {
            tracing::debug!(count = records.len(), "candidate list served from cache");
            return Ok(records.as_ref().clone());
        }
        if !self.cache.is_enabled() {
            return self.inner.fetch_candidates().await;
        }

        let _refill = self.refill.lock().await;
        // filled by whoever held the lock before us
        if let Some(records) = self.cache.peek() {
            return Ok(records.as_ref().clone());
        }
        let records = self.inner.fetch_candidates().await?;
        self.cache.put(records.clone());
        Ok(records)
    }
}
