// Per-Second JSONL Time Series Recorder
// Outputs one JSON line per recorded instant for independent analysis

use serde::Serialize;
use hit_engine::{EngineSnapshot, Trend};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub t_ms: u64,
    pub price: f64,
    pub price_up: Option<bool>,
    pub sma: Option<f64>,
    pub trend: Trend,
    pub volatility: f64,
    pub asset_a: f64,
    pub asset_b: f64,
    pub value_b: f64,
    pub stake_remaining: u32,
    pub auto_trade: bool,
    pub conservation_error: f64,
}

impl TickSnapshot {
    pub fn from_snapshot(t_ms: u64, snapshot: &EngineSnapshot) -> Self {
        Self {
            t_ms,
            price: snapshot.current_price,
            price_up: snapshot.price_change.map(|c| c.is_up()),
            sma: snapshot.sma.last().copied().flatten(),
            trend: snapshot.trend,
            volatility: snapshot.volatility,
            asset_a: snapshot.wallet.asset_a,
            asset_b: snapshot.wallet.asset_b,
            value_b: snapshot.wallet_value_b,
            stake_remaining: snapshot.stake_lock.as_ref().map_or(0, |l| l.remaining_seconds),
            auto_trade: snapshot.auto_trade.enabled,
            conservation_error: snapshot.conservation.error,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, t_ms: u64, snapshot: &EngineSnapshot) {
        self.snapshots.push(TickSnapshot::from_snapshot(t_ms, snapshot));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
