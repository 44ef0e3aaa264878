//! Persisted alert flags: symbol -> threshold label -> armed/sent.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::types::{CrossingEvent, ThresholdRow};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertFlag {
    /// Eligible to fire.
    #[default]
    Armed,
    /// Already notified since the last recovery.
    Sent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AlertState {
    pub symbols: BTreeMap<String, BTreeMap<String, AlertFlag>>,
}

impl AlertState {
    /// Empty state on first run. A file that exists but cannot be parsed is an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("read state file {}", path.display()))?;
        let me = serde_json::from_str::<Self>(&s)
            .with_context(|| format!("parse state file {}", path.display()))?;
        Ok(me)
    }

    /// Overwrite the whole document via a temp file + rename.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let s = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, s).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }

    pub fn flag(&self, symbol: &str, label: &str) -> AlertFlag {
        self.symbols
            .get(symbol)
            .and_then(|b| b.get(label))
            .copied()
            .unwrap_or_default()
    }

    /// Edge-triggered update for one symbol's evaluated rows.
    ///
    /// hit & !sent -> sent (emits a crossing); !hit & sent -> armed; otherwise unchanged.
    pub fn apply(
        &mut self,
        symbol: &str,
        name: &str,
        last_close: f64,
        rows: &[ThresholdRow],
    ) -> Vec<CrossingEvent> {
        let mut crossed = Vec::new();
        for row in rows {
            let prev = self.flag(symbol, &row.label);
            let bucket = self.symbols.entry(symbol.to_string()).or_default();
            match (row.hit, prev) {
                (true, AlertFlag::Armed) => {
                    crossed.push(CrossingEvent {
                        symbol: symbol.to_string(),
                        name: name.to_string(),
                        label: row.label.clone(),
                        level: row.level,
                        last_close,
                    });
                    bucket.insert(row.label.clone(), AlertFlag::Sent);
                }
                (false, AlertFlag::Sent) => {
                    bucket.insert(row.label.clone(), AlertFlag::Armed);
                }
                _ => {}
            }
        }
        crossed
    }
}
