//! Mock candidate directory.
//! 模拟候选服务器目录。
//!
//! Serves a fixed body on `GET /api/sub/` from a loopback port and counts requests, so
//! tests can assert how many times the real HTTP source went to the network.

use axum::{http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct MockDirectory {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockDirectory {
    /// Serve `value` as JSON with status 200. `None` when the sandbox forbids binding.
    pub async fn start_json(value: serde_json::Value) -> Option<Self> {
        Self::start(StatusCode::OK, value.to_string()).await
    }

    /// Serve an arbitrary body and status.
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Option<Self> {
        let listener = crate::net::bind_loopback("mock directory").await?;
        let addr = listener.local_addr().ok()?;
        let hits = Arc::new(AtomicUsize::new(0));
        let body: Arc<str> = Arc::from(body.into());

        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/api/sub/",
            get(move || {
                let counter = Arc::clone(&counter);
                let body = Arc::clone(&body);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        status,
                        [("content-type", "application/json")],
                        body.to_string(),
                    )
                }
            }),
        );
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Some(Self { addr, hits, handle })
    }

    /// Full directory URL, shaped like the production endpoint.
    pub fn url(&self) -> String {
        format!("http://{}/api/sub/?format=json", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockDirectory {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
