//! Shared test utilities for the ssrank workspace
//!
//! - Mock candidate directory (HTTP, random loopback port)
//! - Loopback TCP endpoints that accept, and ports that refuse, for probe tests
//! - Loopback binding that skips instead of failing where sockets are forbidden
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! sr-test-utils = { path = "../sr-test-utils" }
//! ```
//!
//! ```rust,no_run
//! use sr_test_utils::directory::MockDirectory;
//!
//! #[tokio::test]
//! async fn fetch_from_mock() {
//!     let Some(dir) = MockDirectory::start_json(serde_json::json!([])).await else { return };
//!     // point an HttpSource at dir.url()
//! }
//! ```

pub mod directory;
pub mod net;
pub mod tcp;

pub use net::bind_loopback;

use serde_json::{json, Value};

/// One directory entry in the upstream wire shape.
pub fn server_json(host: &str, port: u16, method: &str, password: &str, remarks: &str) -> Value {
    json!({
        "server": host,
        "server_port": port,
        "method": method,
        "password": password,
        "remarks": remarks,
    })
}
