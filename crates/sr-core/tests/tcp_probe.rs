use sr_core::{probe_all, ProbePolicy, Prober, TcpProber};
use sr_test_utils::tcp::{closed_port, AcceptingEndpoint, BlackHoleEndpoint};
use sr_types::{CandidateRecord, ProbeOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn listening_endpoint_is_reachable() {
    let Some(endpoint) = AcceptingEndpoint::start().await else {
        return;
    };
    let record = CandidateRecord::new("127.0.0.1", endpoint.port(), "m", "s", "local");
    let outcome = TcpProber.probe(&record, Duration::from_secs(2)).await;
    let latency = outcome.latency_ms().expect("loopback should accept");
    assert!(latency < 2000);
}

#[tokio::test]
async fn refused_port_is_unreachable() {
    let Some(port) = closed_port().await else {
        return;
    };
    let record = CandidateRecord::new("127.0.0.1", port, "m", "s", "closed");
    let outcome = TcpProber.probe(&record, Duration::from_secs(2)).await;
    assert!(matches!(outcome, ProbeOutcome::Unreachable { .. }));
}

#[tokio::test]
async fn unresolvable_host_is_unreachable() {
    let record = CandidateRecord::new("does-not-exist.invalid", 443, "m", "s", "");
    let outcome = TcpProber.probe(&record, Duration::from_millis(1500)).await;
    assert!(!outcome.is_reachable());
}

#[tokio::test]
async fn mixed_batch_keeps_positions() {
    let (Some(endpoint), Some(port)) = (AcceptingEndpoint::start().await, closed_port().await)
    else {
        return;
    };
    let candidates = vec![
        CandidateRecord::new("127.0.0.1", port, "m", "s", "closed"),
        CandidateRecord::new("127.0.0.1", endpoint.port(), "m", "s", "open"),
    ];
    let results = probe_all(Arc::new(TcpProber), &candidates, &ProbePolicy::default()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.label, "closed");
    assert!(!results[0].outcome.is_reachable());
    assert_eq!(results[1].record.label, "open");
    assert!(results[1].outcome.is_reachable());
}

#[tokio::test]
async fn stalled_handshake_times_out() {
    let Some(hole) = BlackHoleEndpoint::start().await else {
        return;
    };
    let record = CandidateRecord::new("127.0.0.1", hole.port(), "m", "s", "stalled");
    let started = Instant::now();
    let outcome = TcpProber.probe(&record, Duration::from_millis(150)).await;
    assert_eq!(outcome, ProbeOutcome::unreachable("timeout after 150ms"));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn stalled_endpoint_does_not_hold_back_the_batch() {
    let (Some(hole), Some(endpoint)) = (BlackHoleEndpoint::start().await, AcceptingEndpoint::start().await)
    else {
        return;
    };
    let candidates = vec![
        CandidateRecord::new("127.0.0.1", hole.port(), "m", "s", "stalled"),
        CandidateRecord::new("127.0.0.1", endpoint.port(), "m", "s", "open"),
    ];
    let policy = ProbePolicy::default().with_timeout(Duration::from_millis(300));
    let results = probe_all(Arc::new(TcpProber), &candidates, &policy).await;

    assert_eq!(
        results[0].outcome,
        ProbeOutcome::unreachable("timeout after 300ms")
    );
    let latency = results[1].latency_ms().expect("loopback should accept");
    assert!(latency < 300);
}
