//! Entry point. One run per scheduled trigger: Yahoo -> drawdown -> state -> dashboard -> email.

mod config;
mod dashboard;
mod drawdown;
mod error;
mod monitor;
mod notify;
mod prices;
mod state;
mod types;
mod utils;

use chrono::Utc;
use dotenvy::dotenv;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    // Load config
    let cfg_path = std::env::var("DRAWDOWN_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let cfg = config::AppConfig::load_or_default(&cfg_path)?;
    let smtp = config::SmtpSettings::from_env()?;

    let source = prices::YahooClient::new(std::env::var("YAHOO_BASE_URL").ok())?;
    let mailer = notify::SmtpMailer::new(smtp);

    info!(
        "Drawdown run started. Symbols={}, State={}, Dashboard={}, DailyDigest={}",
        cfg.watchlist.len(),
        cfg.state_path,
        cfg.dashboard_path,
        cfg.daily_digest
    );

    let summary = monitor::run(&cfg, &source, &mailer, Utc::now()).await?;

    info!(
        "Run complete: {} reported, {} skipped, {} new crossing(s)",
        summary.reports.len(),
        summary.skipped.len(),
        summary.crossings.len()
    );
    Ok(())
}
