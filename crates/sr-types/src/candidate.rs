use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A server entry obtained from the remote directory.
///
/// Records are immutable once fetched; every downstream stage clones or borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Server hostname or IP literal.
    pub host: String,
    /// Server port, always in `1..=65535`.
    pub port: u16,
    /// Cipher identifier, e.g. `chacha20-ietf-poly1305`.
    pub method: String,
    /// Opaque credential paired with `method`.
    pub secret: String,
    /// Free-text label; may embed a country name, a city and flag symbols.
    pub label: String,
}

impl CandidateRecord {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        method: impl Into<String>,
        secret: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            method: method.into(),
            secret: secret.into(),
            label: label.into(),
        }
    }

    /// Endpoint identity used by the deduplicator.
    #[inline]
    pub fn endpoint_key(&self) -> EndpointKey {
        EndpointKey::new(&self.host, self.port)
    }

    /// `host:port` text, as shown to users.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Derived `host:port` identity. Two records with equal keys point at the same target
/// regardless of their credentials or labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey(String);

impl EndpointKey {
    pub fn new(host: &str, port: u16) -> Self {
        Self(format!("{host}:{port}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EndpointKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
