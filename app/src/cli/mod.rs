pub mod countries;
pub mod export;
pub mod find;
pub mod serve;

use crate::config::Overrides;
use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssrank", version)]
#[command(about = "Find, rank and export the fastest public Shadowsocks servers", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted before or after any subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON or YAML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Candidate directory URL
    #[arg(long, global = true, value_name = "URL")]
    pub source_url: Option<String>,
    /// Maximum number of servers probed
    #[arg(long, global = true)]
    pub bound: Option<usize>,
    /// Per-probe connect timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// Simultaneous probes
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source_url: self.source_url.clone(),
            bound: self.bound,
            timeout_ms: self.timeout_ms,
            concurrency: self.concurrency,
            listen: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe servers for a country and print the fastest
    Find(find::FindArgs),
    /// Print a subscription for the fastest servers
    Subscription(export::SubscriptionArgs),
    /// Print a sing-box client config for the fastest servers
    SingBox(export::SingBoxArgs),
    /// List the distinct country names in the directory
    Countries,
    /// Run the HTTP API
    Serve(serve::ServeArgs),
}
