//! Wiring from [`AppConfig`] to a ready [`Discovery`].

use crate::config::AppConfig;
use sr_core::{CachedSource, Discovery, FetchCache, HttpSource, TcpProber};
use sr_types::FetchError;
use std::sync::Arc;

/// HTTP source behind the fetch cache, real TCP prober, configured locales and policy.
pub fn build_discovery(cfg: &AppConfig) -> Result<Discovery, FetchError> {
    let http = HttpSource::new(cfg.source.url.clone(), cfg.fetch_timeout())?;
    let cache = Arc::new(FetchCache::new(cfg.cache_ttl()));
    tracing::debug!(
        url = %cfg.source.url,
        cache_ttl_secs = cfg.source.cache_ttl_secs,
        "candidate source ready"
    );

    Ok(Discovery::new(Arc::new(CachedSource::new(http, cache)), Arc::new(TcpProber))
        .with_locales(cfg.locale_table())
        .with_policy(cfg.probe_policy()))
}
