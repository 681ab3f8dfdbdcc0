//! Campaign rules bot: evaluates ad campaign performance against fixed
//! rules and proposes (or applies) pauses and budget increases.
//!
//! One invocation is one pass:
//! 1. Load metrics from a snapshot file or the Google Ads account
//! 2. Run the rule chain over every campaign
//! 3. Apply the resulting actions unless preview mode is on
//! 4. Journal the run and post a summary to the webhook

mod bot;
mod config;
mod journal;
mod notify;
mod provider;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use bot::Bot;

/// Ad campaign rules bot
#[derive(Parser)]
#[command(name = "campaign-rules-bot", about = "Rule-based ad campaign optimizer")]
struct Cli {
    /// TOML config file. Defaults to ./config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read campaign metrics from a JSON snapshot instead of Google Ads.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Apply changes. Overrides preview_mode from config and env.
    #[arg(long)]
    apply: bool,

    /// Print campaign performance and each campaign's rule verdict, then
    /// exit without applying, journaling or notifying.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_rules_bot=info,decision_engine=info,execution_engine=info,ads_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("📣 Campaign rules bot starting up...");

    let mut cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if cli.apply {
        cfg.preview_mode = false;
    }

    let mut bot = Bot::new(cfg, cli.snapshot)?;

    if cli.list {
        return bot.list().await;
    }

    let report = bot.run_once().await?;
    info!(
        "Run {} complete: {} campaigns, {} actions, {} failed",
        report.run_id,
        report.campaigns_analyzed,
        report.actions.len(),
        report.failed_applies()
    );
    if !report.journal_errors.is_empty() {
        warn!("{} journal write(s) failed", report.journal_errors.len());
    }
    if let Some(e) = &report.notify_error {
        warn!("Summary was not delivered: {}", e);
    }
    Ok(())
}
