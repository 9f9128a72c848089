//! Candidate source adapter.
//!
//! The remote directory returns a JSON array of objects shaped like
//! `{"server", "server_port", "method", "password", "remarks"}`. A payload that is not an
//! array fails the fetch; an individual element that does not validate is skipped.

use async_trait::async_trait;
use serde_json::Value;
use sr_types::{CandidateRecord, FetchError};
use std::time::Duration;

/// Default remote directory.
pub const DEFAULT_SOURCE_URL: &str = "https://shadowmere.xyz/api/sub/?format=json";

/// Default request timeout for the directory fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Anything that can produce the raw candidate list.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// One fetch, no retry.
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FetchError>;
}

/// HTTP directory client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ssrank/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::transport(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CandidateSource for HttpSource {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FetchError> {
        tracing::debug!(url = %self.url, "fetching candidate list");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "upstream returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("read body: {e}")))?;
        parse_candidates(&body)
    }
}

/// In-memory source, used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<CandidateRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FetchError> {
        Ok(self.records.clone())
    }
}

/// Decode a directory payload.
///
/// # Errors
/// [`FetchError::Parse`] when the body is not JSON or not an array.
pub fn parse_candidates(body: &[u8]) -> Result<Vec<CandidateRecord>, FetchError> {
    let doc: Value = serde_json::from_slice(body).map_err(|e| FetchError::parse(e.to_string()))?;
    let Value::Array(items) = doc else {
        return Err(FetchError::parse("expected a JSON array of servers"));
    };

    let total = items.len();
    let records: Vec<CandidateRecord> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match record_from_value(item) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::debug!(index = idx, reason, "skipping malformed candidate");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::info!(
            total,
            kept = records.len(),
            skipped = total - records.len(),
            "candidate list contained malformed records"
        );
    }
    Ok(records)
}

fn record_from_value(v: &Value) -> Result<CandidateRecord, &'static str> {
    let obj = v.as_object().ok_or("not an object")?;

    let host = obj
        .get("server")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("missing server")?;
    let port = obj
        .get("server_port")
        .and_then(port_field)
        .ok_or("missing or invalid server_port")?;
    let method = obj
        .get("method")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or("missing method")?;
    let secret = obj
        .get("password")
        .and_then(Value::as_str)
        .ok_or("missing password")?;
    let label = match obj.get("remarks") {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err("remarks is not a string"),
    };

    Ok(CandidateRecord::new(host, port, method, secret, label))
}

fn port_field(v: &Value) -> Option<u16> {
    let port = match v {
        Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    }?;
    (port != 0).then_some(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_records() {
        let body = br#"[
            {"server": "1.2.3.4", "server_port": 8388, "method": "aes-256-gcm",
             "password": "pw", "remarks": "Germany"},
            {"server": "ss.example.net", "server_port": "443", "method": "chacha20-ietf-poly1305",
             "password": "x", "remarks": null}
        ]"#;
        let records = parse_candidates(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].host, "1.2.3.4");
        assert_eq!(records[0].secret, "pw");
        assert_eq!(records[1].port, 443);
        assert_eq!(records[1].label, "");
    }

    #[test]
    fn skips_records_with_missing_fields() {
        let body = br#"[
            {"server": "a", "server_port": 1, "password": "pw", "remarks": "no method"},
            {"server": "b", "server_port": 2, "method": "m", "remarks": "no password"},
            {"server": "", "server_port": 3, "method": "m", "password": "p"},
            {"server": "d", "server_port": 0, "method": "m", "password": "p"},
            {"server": "e", "server_port": 70000, "method": "m", "password": "p"},
            {"server": "f", "server_port": 6, "method": "m", "password": "p", "remarks": 5},
            "not an object",
            {"server": "ok", "server_port": 7, "method": "m", "password": "p", "remarks": "ok"}
        ]"#;
        let records = parse_candidates(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "ok");
    }

    #[test]
    fn rejects_non_json_payload() {
        let err = parse_candidates(b"<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = parse_candidates(br#"{"servers": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn empty_array_is_not_an_error() {
        assert!(parse_candidates(b"[]").unwrap().is_empty());
    }

    #[tokio::test]
    async fn static_source_returns_its_records() {
        let r = CandidateRecord::new("h", 1, "m", "s", "l");
        let src = StaticSource::new(vec![r.clone()]);
        assert_eq!(src.fetch_candidates().await.unwrap(), vec![r]);
    }
}
