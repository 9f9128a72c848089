//! Application configuration
//!
//! # Loading order / 加载顺序
//! 1. built-in defaults
//! 2. optional config file (`--config`, JSON or YAML by extension)
//! 3. `SSRANK_*` environment variables (plus `PORT`)
//! 4. command-line flags
//!
//! The merged result is validated once; the pipeline never sees an invalid value.

use serde::{Deserialize, Serialize};
use sr_core::cache::DEFAULT_CACHE_TTL;
use sr_core::probe::{DEFAULT_PROBE_BOUND, DEFAULT_PROBE_CONCURRENCY, DEFAULT_PROBE_TIMEOUT};
use sr_core::source::{DEFAULT_FETCH_TIMEOUT, DEFAULT_SOURCE_URL};
use sr_core::{LocaleTable, ProbePolicy};
use sr_subscribe::{RoutingOptions, SubscriptionMetadata};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_PROBE_CONCURRENCY: usize = tokio::sync::Semaphore::MAX_PERMITS;
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {key}: {value:?}")]
    Env { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Directory endpoint returning the JSON candidate array
    pub url: String,
    pub timeout_ms: u64,
    /// Reuse a successful fetch for this long; 0 disables caching
    pub cache_ttl_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_ms: DEFAULT_FETCH_TIMEOUT.as_millis() as u64,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Upper bound on candidates probed per run
    pub bound: usize,
    /// Per-probe connect timeout
    pub timeout_ms: u64,
    /// In-flight probe cap
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            bound: DEFAULT_PROBE_BOUND,
            timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub probe: ProbeConfig,
    pub server: ServerConfig,
    /// Extra locale aliases merged into the built-in table, e.g. `{"de": ["deutschland"]}`
    pub locales: BTreeMap<String, Vec<String>>,
    pub subscription: SubscriptionMetadata,
    pub routing: RoutingOptions,
}

/// Flag values that override everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_url: Option<String>,
    pub bound: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub listen: Option<String>,
}

impl AppConfig {
    /// Defaults, then `path` if given, then the process environment, then `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if yaml {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply `SSRANK_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SSRANK_SOURCE_URL") {
            self.source.url = url;
        }
        if let Some(v) = env_number(&lookup, "SSRANK_CACHE_TTL_SECS")? {
            self.source.cache_ttl_secs = v;
        }
        if let Some(v) = env_number(&lookup, "SSRANK_PROBE_BOUND")? {
            self.probe.bound = v;
        }
        if let Some(v) = env_number(&lookup, "SSRANK_PROBE_TIMEOUT_MS")? {
            self.probe.timeout_ms = v;
        }
        if let Some(v) = env_number(&lookup, "SSRANK_PROBE_CONCURRENCY")? {
            self.probe.concurrency = v;
        }
        if let Some(listen) = lookup("SSRANK_LISTEN") {
            self.server.listen = listen;
        } else if let Some(port) = env_number::<u16, _>(&lookup, "PORT")? {
            let host = self
                .server
                .listen
                .rsplit_once(':')
                .map(|(h, _)| h.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.server.listen = format!("{host}:{port}");
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, o: &Overrides) {
        if let Some(url) = &o.source_url {
            self.source.url = url.clone();
        }
        if let Some(v) = o.bound {
            self.probe.bound = v;
        }
        if let Some(v) = o.timeout_ms {
            self.probe.timeout_ms = v;
        }
        if let Some(v) = o.concurrency {
            self.probe.concurrency = v;
        }
        if let Some(listen) = &o.listen {
            self.server.listen = listen.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.url must not be empty".into()));
        }
        if self.source.timeout_ms == 0 {
            return Err(ConfigError::Invalid("source.timeout_ms must be > 0".into()));
        }
        if self.probe.bound == 0 {
            return Err(ConfigError::Invalid("probe.bound must be > 0".into()));
        }
        if self.probe.concurrency == 0 {
            return Err(ConfigError::Invalid("probe.concurrency must be > 0".into()));
        }
        if self.probe.concurrency > MAX_PROBE_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "probe.concurrency must be <= {MAX_PROBE_CONCURRENCY}"
            )));
        }
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Invalid("probe.timeout_ms must be > 0".into()));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.listen.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.listen is not a socket address: {:?}",
                self.server.listen
            ))
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.source.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.source.cache_ttl_secs)
    }

    pub fn probe_policy(&self) -> ProbePolicy {
        ProbePolicy::default()
            .with_bound(self.probe.bound)
            .with_timeout(Duration::from_millis(self.probe.timeout_ms))
            .with_concurrency(self.probe.concurrency)
    }

    /// Built-in table plus configured aliases.
    pub fn locale_table(&self) -> LocaleTable {
        let mut table = LocaleTable::builtin();
        for (code, aliases) in &self.locales {
            table.add_aliases(code, aliases);
        }
        table
    }
}

fn env_number<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                key: key.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.probe.bound, 30);
        assert_eq!(cfg.probe.timeout_ms, 2000);
        assert_eq!(cfg.listen_addr().unwrap().port(), 3000);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("SSRANK_SOURCE_URL", "http://127.0.0.1:9/x"),
            ("SSRANK_PROBE_BOUND", "12"),
            ("SSRANK_PROBE_CONCURRENCY", " 4 "),
            ("SSRANK_CACHE_TTL_SECS", "0"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.source.url, "http://127.0.0.1:9/x");
        assert_eq!(cfg.probe.bound, 12);
        assert_eq!(cfg.probe.concurrency, 4);
        assert_eq!(cfg.cache_ttl(), Duration::ZERO);
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    }

    #[test]
    fn explicit_listen_wins_over_port() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("SSRANK_LISTEN", "127.0.0.1:7000"), ("PORT", "8080")]))
            .unwrap();
        assert_eq!(cfg.server.listen, "127.0.0.1:7000");
    }

    #[test]
    fn bad_env_number_is_reported() {
        let err = AppConfig::default()
            .apply_env(env(&[("SSRANK_PROBE_BOUND", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref key, .. } if key == "SSRANK_PROBE_BOUND"));
    }

    #[test]
    fn flags_win_and_validation_rejects_zero() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(&Overrides {
            bound: Some(0),
            ..Overrides::default()
        });
        assert!(cfg.validate().is_err());

        cfg.apply_overrides(&Overrides {
            bound: Some(5),
            concurrency: Some(0),
            ..Overrides::default()
        });
        assert!(cfg.validate().is_err());

        cfg.apply_overrides(&Overrides {
            concurrency: Some(usize::MAX),
            ..Overrides::default()
        });
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("probe.concurrency must be <="));

        cfg.apply_overrides(&Overrides {
            concurrency: Some(2),
            listen: Some("not an address".into()),
            ..Overrides::default()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_and_json_files() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            yaml,
            "probe:\n  bound: 7\nlocales:\n  de: [deutschland]\nrouting:\n  listen_port: 7890\n"
        )
        .unwrap();
        let cfg = AppConfig::from_file(yaml.path()).unwrap();
        assert_eq!(cfg.probe.bound, 7);
        assert_eq!(cfg.probe.concurrency, DEFAULT_PROBE_CONCURRENCY);
        assert_eq!(cfg.routing.listen_port, 7890);
        assert_eq!(cfg.routing.listen, "127.0.0.1");
        let table = cfg.locale_table();
        assert!(table
            .aliases("de")
            .unwrap()
            .iter()
            .any(|a| a == "deutschland"));

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"source": {{"url": "http://x/", "cache_ttl_secs": 5}}}}"#).unwrap();
        let cfg = AppConfig::from_file(json.path()).unwrap();
        assert_eq!(cfg.source.url, "http://x/");
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(5));
        assert_eq!(cfg.source.timeout_ms, 15_000);
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"probe": {{"bount": 3}}}}"#).unwrap();
        let err = AppConfig::from_file(json.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/ssrank.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
