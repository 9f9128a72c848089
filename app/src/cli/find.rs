use crate::config::AppConfig;
use crate::runtime::build_discovery;
use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use sr_api::RESULT_LIMIT;
use sr_core::DiscoveryReport;
use sr_subscribe::to_connection_descriptor;
use std::fmt::Write as _;

#[derive(ClapArgs, Debug)]
pub struct FindArgs {
    /// Country name or code; empty means any
    #[arg(short, long, default_value = "")]
    pub country: String,
    /// How many ranked servers to list
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

pub async fn run(args: FindArgs, cfg: &AppConfig) -> Result<()> {
    let discovery = build_discovery(cfg).context("building candidate source")?;
    let report = discovery
        .discover(&args.country)
        .await
        .context("discovery failed")?;
    print!("{}", render(&report, &args));
    Ok(())
}

/// Human-readable report. Never fails; empty outcomes become a one-line message.
pub fn render(report: &DiscoveryReport, args: &FindArgs) -> String {
    let scope = if args.country.trim().is_empty() {
        "any country".to_string()
    } else {
        format!("'{}'", args.country.trim())
    };

    let mut out = String::new();
    if report.no_match() {
        let _ = writeln!(out, "No servers found matching {scope}");
        return out;
    }
    let _ = writeln!(
        out,
        "{} servers fetched, {} matched {scope}, {} unique, {} tested, {} working",
        report.fetched, report.matched, report.unique, report.tested, report.working_count
    );
    if report.ranked.is_empty() {
        let _ = writeln!(out, "No working servers found");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>3}  {:>8}  {:<28}  {:<24}  NAME",
        "#", "LATENCY", "SERVER", "METHOD"
    );
    for (i, r) in report.ranked.top(args.top).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:>5} ms  {:<28}  {:<24}  {}",
            i + 1,
            r.latency_ms().unwrap_or_default(),
            r.record.endpoint(),
            r.record.method,
            r.record.label
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Config links:");
    for r in report.ranked.top(RESULT_LIMIT) {
        let _ = writeln!(out, "{}", to_connection_descriptor(&r.record));
    }
    out
}
