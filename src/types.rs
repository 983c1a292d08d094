// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::conservation::ConservationResult;
use crate::error::EngineError;
use crate::indicator::Trend;

// ─── Asset ───────────────────────────────────────────────────────────────────

/// The two sides of the wallet. `A` is the volatile coin, `B` the unit it
/// is quoted in; every exchange rate in the engine is the price of one `A`
/// in `B`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Asset {
    /// `$HIT`
    A = 0,
    /// `FauxUSD`
    B = 1,
}

impl Asset {
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn ticker(&self) -> &'static str {
        match self {
            Self::A => "$HIT",
            Self::B => "FauxUSD",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker())
    }
}

impl FromStr for Asset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "$hit" | "hit" => Ok(Self::A),
            "b" | "fauxusd" | "usd" => Ok(Self::B),
            other => Err(EngineError::UnknownAsset(other.to_string())),
        }
    }
}

// ─── Wallet ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub asset_a: f64,
    pub asset_b: f64,
}

impl Wallet {
    pub fn new(asset_a: f64, asset_b: f64) -> Self {
        Self { asset_a, asset_b }
    }

    pub fn balance(&self, asset: Asset) -> f64 {
        match asset {
            Asset::A => self.asset_a,
            Asset::B => self.asset_b,
        }
    }

    pub(crate) fn balance_mut(&mut self, asset: Asset) -> &mut f64 {
        match asset {
            Asset::A => &mut self.asset_a,
            Asset::B => &mut self.asset_b,
        }
    }

    /// Total value expressed in `B` at `rate` (price of one `A` in `B`).
    pub fn value_in_b(&self, rate: f64) -> f64 {
        self.asset_a * rate + self.asset_b
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(0.0069, 420.0)
    }
}

// ─── SwapReceipt ─────────────────────────────────────────────────────────────

/// What a conversion actually did. `applied_amount` can be smaller than
/// the requested amount when the request exceeded the source balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SwapReceipt {
    pub from: Asset,
    pub to: Asset,
    pub requested_amount: f64,
    pub applied_amount: f64,
    pub received_amount: f64,
    pub rate: f64,
}

impl SwapReceipt {
    pub fn was_clamped(&self) -> bool {
        self.applied_amount < self.requested_amount
    }
}

// ─── Price views ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceChange {
    pub absolute: f64,
    pub percent: f64,
}

impl PriceChange {
    pub fn between(current: f64, previous: f64) -> Self {
        let absolute = current - previous;
        let percent = if previous != 0.0 { absolute / previous * 100.0 } else { 0.0 };
        Self { absolute, percent }
    }

    pub fn is_up(&self) -> bool {
        self.absolute >= 0.0
    }
}

/// Result of one price tick.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceTick {
    pub price: f64,
    pub previous_price: f64,
    pub volatility: f64,
}

// ─── Stake views ─────────────────────────────────────────────────────────────

/// Read-only view of a pending stake for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakeLockView {
    pub remaining_seconds: u32,
    pub lock_seconds: u32,
    pub expected_reward_pct: f64,
}

/// Emitted when a lock reaches zero and its outcome hits the wallet.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StakeResolution {
    pub multiplier: f64,
    pub is_failure: bool,
    pub message: Option<String>,
    pub wallet: Wallet,
}

// ─── Auto-trade views ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AutoTradeSettings {
    pub enabled: bool,
    pub proportion: f64,
}

impl Default for AutoTradeSettings {
    fn default() -> Self {
        Self { enabled: false, proportion: 0.1 }
    }
}

/// One automated swap, with the indicator reading that caused it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AutoTradeFill {
    pub price: f64,
    pub sma: f64,
    pub receipt: SwapReceipt,
}

// ─── EngineSnapshot ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub current_price: f64,
    pub previous_price: Option<f64>,
    pub price_change: Option<PriceChange>,
    pub volatility: f64,
    pub history: Vec<f64>,
    pub sma: Vec<Option<f64>>,
    pub trend: Trend,
    pub wallet: Wallet,
    pub wallet_value_b: f64,
    pub stake_lock: Option<StakeLockView>,
    pub auto_trade: AutoTradeSettings,
    pub notice: Option<String>,
    pub conservation: ConservationResult,
    pub running: bool,
}

// ─── TickReport ──────────────────────────────────────────────────────────────

/// Everything that happened during one `advance` call.
#[derive(Debug, Default, Serialize)]
pub struct TickReport {
    pub price_ticks: Vec<PriceTick>,
    pub stake_resolutions: Vec<StakeResolution>,
    pub auto_trades: Vec<AutoTradeFill>,
    pub drains: u32,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.price_ticks.is_empty()
            && self.stake_resolutions.is_empty()
            && self.auto_trades.is_empty()
            && self.drains == 0
    }
}
