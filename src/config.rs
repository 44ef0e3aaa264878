//! Load and validate runtime configuration.

use regex::Regex;
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};
use tracing::info;

use crate::drawdown::threshold_label;
use crate::error::ConfigError;

pub const DEFAULT_THRESHOLDS: [f64; 4] = [0.85, 0.80, 0.75, 0.70];

fn default_thresholds() -> Vec<f64> {
    DEFAULT_THRESHOLDS.to_vec()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: String, // Yahoo symbol, e.g. ^IXIC, ^GSPC, TSLA
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
}

impl WatchlistEntry {
    pub fn new(symbol: &str, name: &str, thresholds: &[f64]) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: Some(name.to_string()),
            thresholds: thresholds.to_vec(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

fn default_watchlist() -> Vec<WatchlistEntry> {
    vec![
        WatchlistEntry::new("^IXIC", "Nasdaq Composite (IXIC)", &DEFAULT_THRESHOLDS),
        WatchlistEntry::new("^GSPC", "S&P 500 (SPX)", &DEFAULT_THRESHOLDS),
        WatchlistEntry::new("TSLA", "Tesla, Inc. (TSLA)", &DEFAULT_THRESHOLDS),
        WatchlistEntry::new("ONDS", "Ondas Holdings (ONDS)", &[0.70]),
    ]
}

fn default_state_path() -> String {
    "state.json".to_string()
}

fn default_dashboard_path() -> String {
    "docs/index.html".to_string()
}

fn default_lookback_years() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default = "default_state_path")]
    pub state_path: String,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
    /// Send the status digest on every run, crossings or not.
    #[serde(default = "default_true")]
    pub daily_digest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watchlist: default_watchlist(),
            state_path: default_state_path(),
            dashboard_path: default_dashboard_path(),
            lookback_years: default_lookback_years(),
            daily_digest: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Built-in watchlist when no config file is present.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(
                "No config at {}, using built-in watchlist",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchlist.is_empty() {
            return Err(ConfigError::Watchlist("watchlist is empty".into()));
        }
        if self.lookback_years == 0 {
            return Err(ConfigError::Watchlist("lookback_years must be >= 1".into()));
        }
        let re_sym = Regex::new(r"^[A-Za-z0-9^.=\-]{1,15}$")
            .map_err(|e| ConfigError::Watchlist(e.to_string()))?;
        let mut symbols = HashSet::new();
        for item in &self.watchlist {
            if !re_sym.is_match(&item.symbol) {
                return Err(ConfigError::Watchlist(format!(
                    "bad symbol {:?}",
                    item.symbol
                )));
            }
            // one state bucket per symbol
            if !symbols.insert(item.symbol.as_str()) {
                return Err(ConfigError::Watchlist(format!(
                    "duplicate symbol {:?}",
                    item.symbol
                )));
            }
            if let Some(f) = item.thresholds.iter().find(|f| !(**f > 0.0 && **f < 1.0)) {
                return Err(ConfigError::Watchlist(format!(
                    "{}: threshold factor {} not in (0,1)",
                    item.symbol, f
                )));
            }
            // one state slot per label
            let mut labels = HashSet::new();
            for f in &item.thresholds {
                let label = threshold_label(*f);
                if !labels.insert(label.clone()) {
                    return Err(ConfigError::Watchlist(format!(
                        "{}: factor {} repeats threshold label {}",
                        item.symbol, f, label
                    )));
                }
            }
        }
        Ok(())
    }
}

/// SMTP submission settings, read once at startup.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub to: String,
    pub from: String,
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |k: &'static str| get(k).ok_or(ConfigError::MissingEnv(k));
        let host = required("SMTP_HOST")?;
        let user = required("SMTP_USER")?;
        let pass = required("SMTP_PASS")?;
        let to = required("TO_EMAIL")?;
        let port = match get("SMTP_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "SMTP_PORT",
                value: v.clone(),
            })?,
            None => 587,
        };
        let from = get("SMTP_FROM").unwrap_or_else(|| user.clone());
        Ok(Self {
            host,
            port,
            user,
            pass,
            to,
            from,
        })
    }
}
