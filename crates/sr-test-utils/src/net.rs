//! Loopback sockets for tests that may run where binding is not allowed.
//!
//! A `PermissionDenied` bind turns into `None` plus a note on stderr, so the calling test
//! returns early. Set `SSRANK_TEST_REQUIRE_NET=1` to make that a hard failure instead.

use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

const REQUIRE_NET: &str = "SSRANK_TEST_REQUIRE_NET";

fn network_required() -> bool {
    std::env::var(REQUIRE_NET)
        .map(|v| !matches!(v.trim(), "" | "0" | "false" | "no" | "off"))
        .unwrap_or(false)
}

/// Bind `127.0.0.1:0`.
pub async fn bind_loopback(purpose: &str) -> Option<TcpListener> {
    match TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await {
        Ok(listener) => Some(listener),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && !network_required() => {
            eprintln!("skipping {purpose}: cannot bind loopback ({e})");
            None
        }
        Err(e) => panic!("{purpose}: bind 127.0.0.1:0: {e}"),
    }
}
