// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Configuration

//! Every tunable constant of the engine.
//!
//! All sections default to the values the game ships with, so a host can
//! override a single field in JSON and leave the rest alone:
//!
//! ```json
//! { "price": { "initial_price": 100.0 }, "auto_trade": { "sma_period": 10 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{AutoTradeSettings, Wallet};

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub price: PriceConfig,
    pub wallet: WalletConfig,
    pub stake: StakeConfig,
    pub auto_trade: AutoTradeConfig,
    pub cadence: CadenceConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.price.validate()?;
        self.wallet.validate()?;
        self.stake.validate()?;
        self.auto_trade.validate()?;
        self.cadence.validate()
    }
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig(msg.into())
}

// ---------------------------------------------------------------------------
// PriceConfig
// ---------------------------------------------------------------------------

/// One periodic momentum term: `amplitude * sin(2π t / period_secs)`,
/// applied as a fraction of the previous price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BiasTerm {
    pub amplitude: f64,
    pub period_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub initial_price: f64,
    pub history_capacity: usize,
    pub initial_volatility: f64,
    pub min_volatility: f64,
    pub max_volatility: f64,
    /// Half-width of the uniform volatility nudge per tick.
    pub volatility_step: f64,
    /// Fixed walk factor used only while seeding the history.
    pub seed_volatility: f64,
    pub price_floor: f64,
    pub bias_terms: Vec<BiasTerm>,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            initial_price: 420.69,
            history_capacity: 200,
            initial_volatility: 0.08,
            min_volatility: 0.02,
            max_volatility: 0.2,
            volatility_step: 0.005,
            seed_volatility: 0.1,
            price_floor: 0.01,
            bias_terms: vec![
                BiasTerm { amplitude: 0.01, period_secs: 60.0 },
                BiasTerm { amplitude: 0.005, period_secs: 600.0 },
            ],
        }
    }
}

impl PriceConfig {
    fn validate(&self) -> Result<()> {
        if !(self.price_floor > 0.0) {
            return Err(invalid("price.price_floor must be positive"));
        }
        if !(self.initial_price >= self.price_floor) || !self.initial_price.is_finite() {
            return Err(invalid("price.initial_price must be finite and at least price_floor"));
        }
        if self.history_capacity < 2 {
            return Err(invalid("price.history_capacity must be at least 2"));
        }
        if !(self.min_volatility > 0.0 && self.min_volatility <= self.max_volatility) {
            return Err(invalid("price volatility bounds must satisfy 0 < min <= max"));
        }
        if !(self.initial_volatility >= self.min_volatility
            && self.initial_volatility <= self.max_volatility)
        {
            return Err(invalid("price.initial_volatility must lie within the volatility bounds"));
        }
        if !(self.volatility_step >= 0.0) || !(self.seed_volatility >= 0.0) {
            return Err(invalid("price volatility steps must be non-negative"));
        }
        for term in &self.bias_terms {
            if !(term.period_secs > 0.0) || !term.amplitude.is_finite() {
                return Err(invalid("price.bias_terms need a positive period and finite amplitude"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WalletConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub starting: Wallet,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self { starting: Wallet::default() }
    }
}

impl WalletConfig {
    fn validate(&self) -> Result<()> {
        let Wallet { asset_a, asset_b } = self.starting;
        if !(asset_a >= 0.0 && asset_b >= 0.0) || !asset_a.is_finite() || !asset_b.is_finite() {
            return Err(invalid("wallet.starting balances must be finite and non-negative"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StakeConfig
// ---------------------------------------------------------------------------

/// One success reward tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RewardTier {
    pub multiplier: f64,
    pub lock_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    pub failure_probability: f64,
    pub failure_multiplier: f64,
    pub failure_lock_seconds: u32,
    pub failure_messages: Vec<String>,
    /// Reward shown on the lock display while a failure is pending.
    pub failure_decoy_reward_pct: f64,
    pub tiers: Vec<RewardTier>,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.10,
            failure_multiplier: 0.5,
            failure_lock_seconds: 10,
            failure_messages: vec![
                "Validator node failed. Stake slashed!".to_string(),
                "Coins lost to MEV attack!".to_string(),
                "DeFi contract hack!".to_string(),
                "Dex owner rug pulled!".to_string(),
            ],
            failure_decoy_reward_pct: 10.0,
            tiers: vec![
                RewardTier { multiplier: 1.1, lock_seconds: 10 },
                RewardTier { multiplier: 1.4, lock_seconds: 30 },
                RewardTier { multiplier: 2.0, lock_seconds: 60 },
            ],
        }
    }
}

impl StakeConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(invalid("stake.failure_probability must lie within [0, 1]"));
        }
        if !(self.failure_multiplier > 0.0) || self.failure_lock_seconds == 0 {
            return Err(invalid("stake failure outcome needs a positive multiplier and lock"));
        }
        if self.failure_messages.is_empty() {
            return Err(invalid("stake.failure_messages must not be empty"));
        }
        if self.tiers.is_empty() {
            return Err(invalid("stake.tiers must not be empty"));
        }
        if self
            .tiers
            .iter()
            .any(|t| !(t.multiplier > 0.0) || !t.multiplier.is_finite() || t.lock_seconds == 0)
        {
            return Err(invalid("stake tiers need a positive multiplier and lock"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AutoTradeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTradeConfig {
    pub sma_period: usize,
    pub initial: AutoTradeSettings,
}

impl Default for AutoTradeConfig {
    fn default() -> Self {
        Self {
            sma_period: 20,
            initial: AutoTradeSettings::default(),
        }
    }
}

impl AutoTradeConfig {
    fn validate(&self) -> Result<()> {
        if self.sma_period == 0 {
            return Err(invalid("auto_trade.sma_period must be positive"));
        }
        if !(0.0..=1.0).contains(&self.initial.proportion) {
            return Err(invalid("auto_trade.initial.proportion must lie within [0, 1]"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CadenceConfig
// ---------------------------------------------------------------------------

/// External drain: every `interval_ms` both balances are scaled by
/// `multiplier`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrainConfig {
    pub interval_ms: u64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub price_ms: u64,
    pub stake_ms: u64,
    pub auto_trade_ms: u64,
    pub drain: Option<DrainConfig>,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            price_ms: 500,
            stake_ms: 1000,
            auto_trade_ms: 1000,
            drain: None,
        }
    }
}

impl CadenceConfig {
    fn validate(&self) -> Result<()> {
        if self.price_ms == 0 || self.stake_ms == 0 || self.auto_trade_ms == 0 {
            return Err(invalid("cadence intervals must be positive"));
        }
        if let Some(drain) = self.drain {
            if drain.interval_ms == 0 || !(0.0..=1.0).contains(&drain.multiplier) {
                return Err(invalid("cadence.drain needs a positive interval and a multiplier in [0, 1]"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.price.history_capacity, 200);
        assert_eq!(config.cadence.price_ms, 500);
        assert_eq!(config.stake.tiers.len(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "price": { "initial_price": 100.0 }, "auto_trade": { "sma_period": 10 } }"#,
        )
        .unwrap();
        assert_eq!(config.price.initial_price, 100.0);
        assert_eq!(config.price.history_capacity, 200);
        assert_eq!(config.auto_trade.sma_period, 10);
        assert_eq!(config.stake.failure_lock_seconds, 10);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed.price.bias_terms, config.price.bias_terms);
        assert_eq!(parsed.stake.tiers, config.stake.tiers);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn test_rejects_inverted_volatility_bounds() {
        let mut config = EngineConfig::default();
        config.price.min_volatility = 0.3;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_tier_table() {
        let mut config = EngineConfig::default();
        config.stake.tiers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_cadence() {
        let mut config = EngineConfig::default();
        config.cadence.stake_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_starting_wallet() {
        let mut config = EngineConfig::default();
        config.wallet.starting = Wallet::new(-1.0, 10.0);
        assert!(config.validate().is_err());
    }
}
