//! One scheduled run: fetch -> compute -> evaluate/update state -> persist -> dashboard -> notify.

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::dashboard;
use crate::drawdown::evaluate_thresholds;
use crate::notify::{compose_crossing_alert, compose_daily_digest, Mailer};
use crate::prices::PriceSource;
use crate::state::AlertState;
use crate::types::{RunSummary, TickerReport, TickerStatus};
use crate::utils::fmt_pct;

pub async fn run(
    cfg: &AppConfig,
    source: &dyn PriceSource,
    mailer: &dyn Mailer,
    now: DateTime<Utc>,
) -> anyhow::Result<RunSummary> {
    let mut state = AlertState::load(&cfg.state_path)?;
    let mut summary = RunSummary::default();

    for item in &cfg.watchlist {
        let symbol = item.symbol.as_str();
        let name = item.display_name();

        let closes = match source.daily_closes(symbol, cfg.lookback_years).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Fetch failed for {}, skipping: {}", symbol, e);
                summary.skipped.push(symbol.to_string());
                continue;
            }
        };
        if closes.is_empty() {
            warn!("No data for {}, skipping.", symbol);
            summary.skipped.push(symbol.to_string());
            continue;
        }
        let Some(status) = TickerStatus::from_closes(&closes) else {
            warn!("Non-positive closing high for {}, skipping.", symbol);
            summary.skipped.push(symbol.to_string());
            continue;
        };

        let rows = evaluate_thresholds(status.ath_close, status.last_close, &item.thresholds);
        info!(
            "{} last={:.2} ath={:.2} dd={} ({} closes)",
            symbol,
            status.last_close,
            status.ath_close,
            fmt_pct(status.drawdown),
            closes.len()
        );

        let crossed = state.apply(symbol, name, status.last_close, &rows);
        for c in &crossed {
            info!("{} crossed -{} at {:.2}", c.symbol, c.label, c.level);
        }
        summary.crossings.extend(crossed);
        summary.reports.push(TickerReport {
            symbol: symbol.to_string(),
            name: name.to_string(),
            status,
            rows,
        });
    }

    state
        .save(&cfg.state_path)
        .context("persist alert state")?;

    let html = dashboard::render(&summary.reports, now);
    dashboard::write(&cfg.dashboard_path, &html)?;
    info!("Dashboard written to {}", cfg.dashboard_path);

    if let Some((subject, body)) = compose_crossing_alert(&summary.crossings) {
        mailer
            .send(&subject, &body)
            .await
            .context("send threshold alert")?;
    }

    if cfg.daily_digest {
        let (subject, body) = compose_daily_digest(&summary.reports, &summary.crossings, now);
        if let Err(e) = mailer.send(&subject, &body).await {
            warn!("[DAILY EMAIL] Failed to send status email: {:#}", e);
        }
    }

    Ok(summary)
}
