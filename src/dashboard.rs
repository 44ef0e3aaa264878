//! Static HTML status page, one section per watchlist symbol.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::{fmt::Write as _, fs, path::Path};

use crate::types::TickerReport;
use crate::utils::{escape_html, fmt_pct, fmt_price};

const HIT_COLOR: &str = "#c33";
const CLEAR_COLOR: &str = "#2a7";

pub fn render(reports: &[TickerReport], now: DateTime<Utc>) -> String {
    let mut sections = String::new();
    for r in reports {
        let mut items = String::new();
        for row in &r.rows {
            let (color, text) = if row.hit {
                (HIT_COLOR, "TRIGGERED")
            } else {
                (CLEAR_COLOR, "not triggered")
            };
            let _ = write!(
                items,
                "<li>-{}: {} &ndash; <b style='color:{}'>{}</b></li>\n    ",
                escape_html(&row.label),
                fmt_price(row.level),
                color,
                text
            );
        }
        let _ = write!(
            sections,
            r#"
<section style="margin-bottom:24px">
  <h2 style="margin:6px 0">{name} &mdash; {symbol}</h2>
  <div>Last close: <b>{last}</b> &nbsp;|&nbsp; ATH close: <b>{ath}</b> &nbsp;|&nbsp; Drawdown: <b>{dd}</b></div>
  <ul style="line-height:1.7;margin-top:8px">
    {items}
  </ul>
</section>
"#,
            name = escape_html(&r.name),
            symbol = escape_html(&r.symbol),
            last = fmt_price(r.status.last_close),
            ath = fmt_price(r.status.ath_close),
            dd = fmt_pct(r.status.drawdown),
            items = items.trim_end(),
        );
    }
    if reports.is_empty() {
        sections.push_str("\n<p>No data available for any watchlist symbol this run.</p>\n");
    }

    format!(
        r#"<!doctype html><html><head><meta charset="utf-8">
<title>Multi-Asset Drawdown Dashboard</title>
<style>
body {{ font-family: system-ui, Segoe UI, Arial, sans-serif; max-width: 900px; margin: 32px auto }}
h1 {{ margin-bottom: 8px }}
small {{ color:#666 }}
hr {{ border:none; border-top:1px solid #eee; margin: 24px 0 }}
</style>
</head><body>
<h1>Market Drawdown Dashboard <small>(updated {now})</small></h1>
{sections}
<hr>
<p>Data source: Yahoo Finance (daily close). Thresholds are calculated from all-time closing highs.</p>
</body></html>
"#,
        now = now.format("%Y-%m-%d %H:%M UTC"),
        sections = sections,
    )
}

pub fn write(path: impl AsRef<Path>, html: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    fs::write(path, html).with_context(|| format!("write dashboard {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawdown::evaluate_thresholds;
    use crate::types::TickerStatus;
    use chrono::TimeZone;

    fn report(symbol: &str, name: &str, closes: &[f64]) -> TickerReport {
        let status = TickerStatus::from_closes(closes).unwrap();
        TickerReport {
            symbol: symbol.into(),
            name: name.into(),
            rows: evaluate_thresholds(status.ath_close, status.last_close, &[0.85, 0.80]),
            status,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 21, 5, 0).unwrap()
    }

    #[test]
    fn renders_sections_and_colors() {
        let reports = vec![
            report("^IXIC", "Nasdaq Composite (IXIC)", &[100.0, 84.0]),
            report("TSLA", "Tesla, Inc. (TSLA)", &[20000.0, 19000.0]),
        ];
        let html = render(&reports, ts());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("(updated 2025-03-14 21:05 UTC)"));
        assert!(html.contains("Nasdaq Composite (IXIC) &mdash; ^IXIC"));
        assert!(html.contains("Last close: <b>84.00</b>"));
        assert!(html.contains("ATH close: <b>20,000.00</b>"));
        assert!(html.contains("Drawdown: <b>-16.00%</b>"));
        assert!(html.contains("<li>-15%: 85.00 &ndash; <b style='color:#c33'>TRIGGERED</b></li>"));
        assert!(html.contains("<li>-20%: 80.00 &ndash; <b style='color:#2a7'>not triggered</b></li>"));
        assert_eq!(html.matches("<section").count(), 2);
        assert!(html.contains("Data source: Yahoo Finance"));
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let reports = vec![report("^GSPC", "S&P 500 (SPX)", &[10.0, 9.0])];
        assert_eq!(render(&reports, ts()), render(&reports, ts()));
        assert!(render(&reports, ts()).contains("S&amp;P 500 (SPX)"));
    }

    #[test]
    fn no_external_assets() {
        let html = render(&[report("X", "X", &[1.0])], ts());
        assert!(!html.contains("src="));
        assert!(!html.contains("href="));
    }

    #[test]
    fn write_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("drawdown-watch-dash-{}", std::process::id()));
        let path = dir.join("docs").join("index.html");
        write(&path, "<p>ok</p>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>ok</p>");
        let _ = fs::remove_dir_all(dir);
    }
}
