//! ssrank entrypoint
//! - parse flags, init tracing
//! - load config (defaults → file → env → flags)
//! - dispatch subcommand

use anyhow::Context;
use clap::Parser;
use ssrank::cli::{self, Args, Commands};
use ssrank::config::AppConfig;
use ssrank::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.global.log_format);

    let mut overrides = args.global.overrides();
    if let Commands::Serve(serve) = &args.command {
        overrides.listen = serve.listen.clone();
    }
    let cfg = AppConfig::load(args.global.config.as_deref(), &overrides)
        .context("loading configuration")?;
    tracing::debug!(?cfg, "configuration loaded");

    match args.command {
        Commands::Find(a) => cli::find::run(a, &cfg).await,
        Commands::Subscription(a) => cli::export::subscription(a, &cfg).await,
        Commands::SingBox(a) => cli::export::sing_box(a, &cfg).await,
        Commands::Countries => cli::countries::run(&cfg).await,
        Commands::Serve(_) => cli::serve::run(&cfg).await,
    }
}
