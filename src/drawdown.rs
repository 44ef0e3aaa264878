//! Drawdown from the all-time closing high and threshold evaluation.

use crate::types::{ThresholdRow, TickerStatus};

impl TickerStatus {
    /// Derive last/ATH/drawdown from a time-ordered close series.
    ///
    /// Returns `None` for an empty series or when the maximum close is not positive.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        let last_close = *closes.last()?;
        let ath_close = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if ath_close <= 0.0 || !ath_close.is_finite() {
            return None;
        }
        Some(Self {
            last_close,
            ath_close,
            drawdown: last_close / ath_close - 1.0,
        })
    }
}

/// "15%" for a factor of 0.85.
pub fn threshold_label(factor: f64) -> String {
    // 1 - 0.80 is 0.19999999999999996 in binary floating point
    let pct = ((1.0 - factor) * 100.0 + 1e-9).floor() as i64;
    format!("{}%", pct)
}

pub fn evaluate_thresholds(ath_close: f64, last_close: f64, factors: &[f64]) -> Vec<ThresholdRow> {
    factors
        .iter()
        .map(|&factor| {
            let level = ath_close * factor;
            ThresholdRow {
                label: threshold_label(factor),
                level,
                hit: last_close <= level,
            }
        })
        .collect()
}
