//! Core domain types for per-run drawdown status, threshold rows and crossings.

/// Latest close against the all-time closing high of the lookback window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerStatus {
    pub last_close: f64,
    pub ath_close: f64,
    pub drawdown: f64, // last/ath - 1, never positive
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRow {
    pub label: String, // e.g. "15%"
    pub level: f64,
    pub hit: bool,
}

/// One evaluated watchlist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub symbol: String,
    pub name: String,
    pub status: TickerStatus,
    pub rows: Vec<ThresholdRow>,
}

/// An armed -> sent transition observed during this run.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingEvent {
    pub symbol: String,
    pub name: String,
    pub label: String,
    pub level: f64,
    pub last_close: f64,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<TickerReport>,
    pub skipped: Vec<String>,
    pub crossings: Vec<CrossingEvent>,
}
