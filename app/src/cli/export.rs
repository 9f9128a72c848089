//! `subscription` and `sing-box` commands.

use crate::config::AppConfig;
use crate::runtime::build_discovery;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, ValueEnum};
use sr_api::RESULT_LIMIT;
use sr_subscribe::{
    format_timestamp, to_routing_config, to_subscription_text, SubscriptionOptions,
};
use sr_types::CandidateRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubscriptionFormat {
    /// One ss:// link per line
    Plain,
    /// The plain list base64-encoded as one blob
    Base64,
    /// Metadata header and rank markers
    Hiddify,
}

#[derive(ClapArgs, Debug)]
pub struct SubscriptionArgs {
    #[arg(short, long, default_value = "")]
    pub country: String,
    #[arg(long, value_enum, default_value_t = SubscriptionFormat::Plain)]
    pub format: SubscriptionFormat,
}

#[derive(ClapArgs, Debug)]
pub struct SingBoxArgs {
    #[arg(short, long, default_value = "")]
    pub country: String,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn subscription(args: SubscriptionArgs, cfg: &AppConfig) -> Result<()> {
    let Some(records) = best(cfg, &args.country).await? else {
        return Ok(());
    };
    let options = match args.format {
        SubscriptionFormat::Plain => SubscriptionOptions::plain(),
        SubscriptionFormat::Base64 => SubscriptionOptions::base64(),
        SubscriptionFormat::Hiddify => {
            SubscriptionOptions::hiddify(format_timestamp(&chrono::Local::now()))
                .with_metadata(cfg.subscription.clone())
        }
    };
    println!("{}", to_subscription_text(&records, &options));
    Ok(())
}

pub async fn sing_box(args: SingBoxArgs, cfg: &AppConfig) -> Result<()> {
    let Some(records) = best(cfg, &args.country).await? else {
        return Ok(());
    };
    let config = to_routing_config(&records, &cfg.routing);
    let text = if args.pretty {
        serde_json::to_string_pretty(&config)
    } else {
        serde_json::to_string(&config)
    }
    .context("serializing sing-box config")?;
    println!("{text}");
    Ok(())
}

/// Top ranked records, or `None` after telling the user why there are none.
async fn best(cfg: &AppConfig, country: &str) -> Result<Option<Vec<CandidateRecord>>> {
    let discovery = build_discovery(cfg).context("building candidate source")?;
    let report = discovery
        .discover(country)
        .await
        .context("discovery failed")?;

    if report.no_match() {
        eprintln!("No servers found");
        return Ok(None);
    }
    if report.ranked.is_empty() {
        eprintln!("No working servers found ({} tested)", report.tested);
        return Ok(None);
    }
    Ok(Some(report.ranked.top_records(RESULT_LIMIT)))
}
