//! Latency prober.
//!
//! Each candidate gets exactly one TCP connection attempt bounded by the per-probe timeout.
//! The elapsed time until the handshake completes is the latency; the socket is dropped
//! right after. Probes run as independent tasks behind a semaphore and report
//! `(position, outcome)` over a channel to a single aggregator that fills a pre-sized slot
//! vector, so the returned order is the input order regardless of completion order.

use async_trait::async_trait;
use sr_types::{CandidateRecord, ProbeOutcome, ProbeResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Default number of candidates probed per run.
pub const DEFAULT_PROBE_BOUND: usize = 30;
/// Default per-attempt timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);
/// Default number of simultaneous attempts.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 16;

/// Probe limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Only the first `bound` candidates are probed.
    pub bound: usize,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Maximum attempts in flight.
    pub concurrency: usize,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            bound: DEFAULT_PROBE_BOUND,
            timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

impl ProbePolicy {
    pub fn with_bound(mut self, bound: usize) -> Self {
        self.bound = bound;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// A single reachability measurement.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Must not retry and must honor `timeout`.
    async fn probe(&self, record: &CandidateRecord, timeout: Duration) -> ProbeOutcome;
}

/// Raw TCP handshake prober. Name resolution counts against the timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, record: &CandidateRecord, timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();
        let attempt = TcpStream::connect((record.host.as_str(), record.port));
        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(stream)) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                drop(stream);
                ProbeOutcome::Reachable { latency_ms }
            }
            Ok(Err(e)) => ProbeOutcome::unreachable(e.to_string()),
            Err(_) => timed_out(timeout),
        }
    }
}

fn timed_out(timeout: Duration) -> ProbeOutcome {
    ProbeOutcome::unreachable(format!("timeout after {}ms", timeout.as_millis()))
}

/// Probe the first `policy.bound` candidates.
///
/// Results are returned in candidate order with `position` set to the candidate index.
/// A probe task that panics is recorded as unreachable; it never fails the batch.
/// `policy.timeout` is enforced here as well, so a prober that overruns it is cut off.
pub async fn probe_all(
    prober: Arc<dyn Prober>,
    candidates: &[CandidateRecord],
    policy: &ProbePolicy,
) -> Vec<ProbeResult> {
    let targets: Vec<CandidateRecord> = candidates.iter().take(policy.bound).cloned().collect();
    if targets.is_empty() {
        return Vec::new();
    }

    let permits = policy.concurrency.clamp(1, Semaphore::MAX_PERMITS);
    let semaphore = Arc::new(Semaphore::new(permits));
    let (tx, mut rx) = mpsc::channel::<(usize, ProbeOutcome)>(targets.len());
    let mut tasks = JoinSet::new();

    for (position, record) in targets.iter().cloned().enumerate() {
        let prober = Arc::clone(&prober);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        let timeout = policy.timeout;
        tasks.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(permit) => {
                    let attempt = prober.probe(&record, timeout);
                    let outcome = match tokio::time::timeout(timeout, attempt).await {
                        Ok(outcome) => outcome,
                        Err(_) => timed_out(timeout),
                    };
                    drop(permit);
                    outcome
                }
                Err(_) => ProbeOutcome::unreachable("probe pool closed"),
            };
            // receiver only goes away if the whole batch was dropped
            let _ = tx.send((position, outcome)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<ProbeOutcome>> = vec![None; targets.len()];
    while let Some((position, outcome)) = rx.recv().await {
        match &outcome {
            ProbeOutcome::Reachable { latency_ms } => tracing::debug!(
                endpoint = %targets[position].endpoint(),
                latency_ms = *latency_ms,
                "probe ok"
            ),
            ProbeOutcome::Unreachable { reason } => tracing::debug!(
                endpoint = %targets[position].endpoint(),
                reason = %reason,
                "probe failed"
            ),
        }
        slots[position] = Some(outcome);
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "probe task aborted");
        }
    }

    targets
        .into_iter()
        .zip(slots)
        .enumerate()
        .map(|(position, (record, slot))| {
            let outcome = slot.unwrap_or_else(|| ProbeOutcome::unreachable("probe interrupted"));
            ProbeResult::new(position, record, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted prober: latency per host, `None` means unreachable; records every call.
    struct Scripted {
        latencies: HashMap<String, Option<u64>>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Scripted {
        fn new(entries: &[(&str, Option<u64>)]) -> Self {
            Self {
                latencies: entries
                    .iter()
                    .map(|(h, l)| ((*h).to_string(), *l))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for Scripted {
        async fn probe(&self, record: &CandidateRecord, _timeout: Duration) -> ProbeOutcome {
            self.calls.lock().push(record.host.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let latency = self.latencies.get(&record.host).copied().flatten();
            // finish in reverse latency order to scramble arrival order
            tokio::time::sleep(Duration::from_millis(latency.unwrap_or(5))).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            match latency {
                Some(latency_ms) => ProbeOutcome::Reachable { latency_ms },
                None => ProbeOutcome::unreachable("scripted failure"),
            }
        }
    }

    fn rec(host: &str) -> CandidateRecord {
        CandidateRecord::new(host, 443, "m", "s", host)
    }

    #[tokio::test]
    async fn results_follow_candidate_order_not_arrival_order() {
        let prober = Arc::new(Scripted::new(&[
            ("slow", Some(60)),
            ("dead", None),
            ("fast", Some(1)),
        ]));
        let candidates = vec![rec("slow"), rec("dead"), rec("fast")];
        let results = probe_all(prober, &candidates, &ProbePolicy::default()).await;

        let hosts: Vec<_> = results.iter().map(|r| r.record.host.as_str()).collect();
        assert_eq!(hosts, vec!["slow", "dead", "fast"]);
        assert_eq!(
            results.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(results[0].latency_ms(), Some(60));
        assert!(!results[1].outcome.is_reachable());
        assert_eq!(results[2].latency_ms(), Some(1));
    }

    #[tokio::test]
    async fn bound_limits_attempts() {
        let hosts: Vec<String> = (0..50).map(|i| format!("h{i}")).collect();
        let entries: Vec<(&str, Option<u64>)> = hosts.iter().map(|h| (h.as_str(), Some(1))).collect();
        let prober = Arc::new(Scripted::new(&entries));
        let candidates: Vec<_> = hosts.iter().map(|h| rec(h)).collect();

        let policy = ProbePolicy::default().with_bound(30);
        let results = probe_all(prober.clone(), &candidates, &policy).await;

        assert_eq!(results.len(), 30);
        let calls = prober.calls.lock().clone();
        assert_eq!(calls.len(), 30);
        for untouched in &hosts[30..] {
            assert!(!calls.contains(untouched));
        }
    }

    #[tokio::test]
    async fn concurrency_cap_is_respected() {
        let hosts: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
        let entries: Vec<(&str, Option<u64>)> =
            hosts.iter().map(|h| (h.as_str(), Some(10))).collect();
        let prober = Arc::new(Scripted::new(&entries));
        let candidates: Vec<_> = hosts.iter().map(|h| rec(h)).collect();

        let policy = ProbePolicy::default().with_concurrency(3);
        let results = probe_all(prober.clone(), &candidates, &policy).await;

        assert_eq!(results.len(), 12);
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let prober = Arc::new(Scripted::new(&[("a", Some(1))]));
        let policy = ProbePolicy::default().with_concurrency(0);
        let results = probe_all(prober, &[rec("a")], &policy).await;
        assert_eq!(results[0].latency_ms(), Some(1));
    }

    #[tokio::test]
    async fn oversized_concurrency_is_clamped() {
        let prober = Arc::new(Scripted::new(&[("a", Some(1))]));
        let policy = ProbePolicy::default().with_concurrency(usize::MAX);
        let results = probe_all(prober, &[rec("a")], &policy).await;
        assert_eq!(results[0].latency_ms(), Some(1));
    }

    #[tokio::test]
    async fn empty_input_probes_nothing() {
        let prober = Arc::new(Scripted::new(&[]));
        assert!(probe_all(prober.clone(), &[], &ProbePolicy::default())
            .await
            .is_empty());
        assert!(prober.calls.lock().is_empty());
    }

    struct Panicky;

    #[async_trait]
    impl Prober for Panicky {
        async fn probe(&self, record: &CandidateRecord, _timeout: Duration) -> ProbeOutcome {
            if record.host == "boom" {
                panic!("probe blew up");
            }
            ProbeOutcome::Reachable { latency_ms: 7 }
        }
    }

    #[tokio::test]
    async fn panicking_probe_is_recorded_as_unreachable() {
        let results = probe_all(
            Arc::new(Panicky),
            &[rec("ok"), rec("boom"), rec("ok2")],
            &ProbePolicy::default(),
        )
        .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].latency_ms(), Some(7));
        assert_eq!(
            results[1].outcome,
            ProbeOutcome::unreachable("probe interrupted")
        );
        assert_eq!(results[2].latency_ms(), Some(7));
    }

    /// Ignores the timeout it is handed.
    struct Hanging;

    #[async_trait]
    impl Prober for Hanging {
        async fn probe(&self, record: &CandidateRecord, _timeout: Duration) -> ProbeOutcome {
            if record.host == "stuck" {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return ProbeOutcome::Reachable { latency_ms: 30_000 };
            }
            ProbeOutcome::Reachable { latency_ms: 3 }
        }
    }

    #[tokio::test]
    async fn overrunning_probe_is_cut_off_at_the_timeout() {
        let policy = ProbePolicy::default().with_timeout(Duration::from_millis(50));
        let started = Instant::now();
        let results = probe_all(Arc::new(Hanging), &[rec("stuck"), rec("quick")], &policy).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(results[0].outcome, ProbeOutcome::unreachable("timeout after 50ms"));
        assert_eq!(results[1].latency_ms(), Some(3));
    }
}
