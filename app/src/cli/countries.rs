use crate::config::AppConfig;
use crate::runtime::build_discovery;
use anyhow::{Context, Result};
use sr_core::unique_countries;

pub async fn run(cfg: &AppConfig) -> Result<()> {
    let discovery = build_discovery(cfg).context("building candidate source")?;
    let candidates = discovery
        .candidates()
        .await
        .context("fetching candidate list")?;
    for country in unique_countries(&candidates) {
        println!("{country}");
    }
    Ok(())
}
