// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Error Types

use crate::types::Asset;

/// Errors surfaced to callers of the engine. None of them leave the
/// engine in a broken state: every rejected call is a no-op.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid swap amount: {0}")]
    InvalidSwapAmount(String),

    #[error("invalid swap pair: cannot swap {0} for itself")]
    InvalidSwapPair(Asset),

    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(f64),

    #[error("invalid scale multiplier: {0}")]
    InvalidMultiplier(f64),

    #[error("auto-trade proportion must be within [0, 1], got {0}")]
    InvalidProportion(f64),

    #[error("unknown asset: {0:?}")]
    UnknownAsset(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
