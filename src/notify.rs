//! Plain-text email over authenticated STARTTLS SMTP, plus the two message bodies we send.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::info;

use crate::config::SmtpSettings;
use crate::error::NotifyError;
use crate::types::{CrossingEvent, TickerReport};
use crate::utils::{fmt_pct, fmt_price, mask_user};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Mailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let s = &self.settings;
        info!(
            "[EMAIL] Host={} Port={} User={} To={}",
            s.host,
            s.port,
            mask_user(&s.user),
            s.to
        );
        let msg = Message::builder()
            .from(s.from.parse()?)
            .to(s.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&s.host)?
            .port(s.port)
            .credentials(Credentials::new(s.user.clone(), s.pass.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        transport.send(msg).await?;
        info!("[EMAIL] Sent OK: {}", subject);
        Ok(())
    }
}

/// Subject and body for this run's new crossings; `None` when nothing crossed.
pub fn compose_crossing_alert(crossed: &[CrossingEvent]) -> Option<(String, String)> {
    if crossed.is_empty() {
        return None;
    }
    let subject = format!(
        "Threshold alert(s): {}",
        crossed
            .iter()
            .map(|c| format!("{} -{}", c.name, c.label))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let body = crossed
        .iter()
        .map(|c| {
            format!(
                "• {} ({}) crossed -{} at {} (last close {})",
                c.name,
                c.symbol,
                c.label,
                fmt_price(c.level),
                fmt_price(c.last_close)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some((subject, body))
}

/// Status of every reported symbol plus today's crossings, sent regardless of crossings.
pub fn compose_daily_digest(
    reports: &[TickerReport],
    crossed: &[CrossingEvent],
    now: DateTime<Utc>,
) -> (String, String) {
    let mut lines = Vec::new();
    for r in reports {
        lines.push(format!(
            "{} ({})\n  Last: {} | ATH: {} | DD: {}",
            r.name,
            r.symbol,
            fmt_price(r.status.last_close),
            fmt_price(r.status.ath_close),
            fmt_pct(r.status.drawdown)
        ));
        for row in &r.rows {
            lines.push(format!(
                "  • -{}: {} – {}",
                row.label,
                fmt_price(row.level),
                if row.hit { "TRIGGERED" } else { "not triggered" }
            ));
        }
    }

    let mut crossed_lines = Vec::new();
    if crossed.is_empty() {
        crossed_lines.push("Crossed thresholds today: (none)".to_string());
    } else {
        crossed_lines.push("Crossed thresholds today:".to_string());
        for c in crossed {
            crossed_lines.push(format!(
                "• {} ({}): -{} at {}",
                c.name,
                c.symbol,
                c.label,
                fmt_price(c.level)
            ));
        }
    }

    let subject = "Daily status: drawdown watchlist".to_string();
    let body = format!(
        "Market Drawdown — Daily Status ({})\n\n{}\n\n{}",
        now.format("%Y-%m-%d %H:%M:%S UTC"),
        lines.join("\n"),
        crossed_lines.join("\n")
    );
    (subject, body)
}
