use crate::config::AppConfig;
use crate::runtime::build_discovery;
use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use sr_api::{bind_and_serve, ApiState};
use std::sync::Arc;

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

/// Serve until Ctrl-C.
pub async fn run(cfg: &AppConfig) -> Result<()> {
    let addr = cfg.listen_addr()?;
    let discovery = build_discovery(cfg).context("building candidate source")?;
    let state = ApiState::new(Arc::new(discovery))
        .with_metadata(cfg.subscription.clone())
        .with_routing(cfg.routing.clone());

    bind_and_serve(addr, state, shutdown_signal())
        .await
        .with_context(|| format!("serving on {addr}"))?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("ctrl-c received, shutting down"),
        Err(e) => {
            tracing::warn!(error = %e, "ctrl-c handler unavailable; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
