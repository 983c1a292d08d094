// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Ledger

//! The wallet and the only operations allowed to mutate it.
//!
//! Manual swaps, automated swaps, stake resolution and the external drain
//! all go through [`Ledger::convert`] or [`Ledger::scale`]. Each call is a
//! single synchronous step: either it fully applies or it returns an error
//! and leaves the wallet untouched.

use serde::{Deserialize, Serialize};

use crate::conservation::{ConservationLaw, ConservationResult};
use crate::error::{EngineError, Result};
use crate::types::{Asset, SwapReceipt, Wallet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    wallet: Wallet,
    conservation: ConservationLaw,
}

impl Ledger {
    pub fn new(wallet: Wallet) -> Self {
        Self {
            wallet,
            conservation: ConservationLaw::new(),
        }
    }

    pub fn wallet(&self) -> Wallet {
        self.wallet
    }

    pub fn balance(&self, asset: Asset) -> f64 {
        self.wallet.balance(asset)
    }

    pub fn conservation(&self) -> ConservationResult {
        self.conservation.result()
    }

    pub fn conservation_law(&self) -> &ConservationLaw {
        &self.conservation
    }

    /// Total wallet value in `B` at `rate`.
    pub fn value_in_b(&self, rate: f64) -> f64 {
        self.wallet.value_in_b(rate)
    }

    /// Convert `amount` of `from` into `to` at `rate` (price of one `A`
    /// in `B`).
    ///
    /// Requests larger than the available balance are clamped to it; the
    /// receipt reports what was actually applied.
    pub fn convert(&mut self, from: Asset, to: Asset, amount: f64, rate: f64) -> Result<SwapReceipt> {
        validate_pair(from, to)?;
        validate_amount(amount)?;
        validate_rate(rate)?;

        let available = self.wallet.balance(from);
        let applied = amount.min(available).max(0.0);
        let received = if applied > 0.0 { receive_for(from, applied, rate) } else { 0.0 };

        let receipt = SwapReceipt {
            from,
            to,
            requested_amount: amount,
            applied_amount: applied,
            received_amount: received,
            rate,
        };
        if applied == 0.0 {
            tracing::debug!(%from, %to, amount, "swap skipped: empty source balance");
            return Ok(receipt);
        }

        let before = self.wallet;
        let source = self.wallet.balance_mut(from);
        *source = (*source - applied).max(0.0);
        let dest = self.wallet.balance_mut(to);
        *dest = (*dest + received).max(0.0);

        self.conservation.verify_conversion(&before, &self.wallet, rate);

        tracing::debug!(
            %from,
            %to,
            requested = amount,
            applied,
            received,
            rate,
            clamped = receipt.was_clamped(),
            "swap applied"
        );
        Ok(receipt)
    }

    /// Multiply both balances by `multiplier`.
    pub fn scale(&mut self, multiplier: f64) -> Result<Wallet> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(EngineError::InvalidMultiplier(multiplier));
        }
        self.wallet.asset_a = (self.wallet.asset_a * multiplier).max(0.0);
        self.wallet.asset_b = (self.wallet.asset_b * multiplier).max(0.0);
        tracing::debug!(multiplier, a = self.wallet.asset_a, b = self.wallet.asset_b, "wallet scaled");
        Ok(self.wallet)
    }

    /// How much `to` a spend of `amount` would yield, ignoring balance.
    pub fn quote_receive(from: Asset, to: Asset, amount: f64, rate: f64) -> Result<f64> {
        validate_pair(from, to)?;
        validate_quote_amount(amount)?;
        validate_rate(rate)?;
        Ok(receive_for(from, amount, rate))
    }

    /// How much `from` must be spent to receive `amount` of `to`.
    pub fn quote_spend(from: Asset, to: Asset, amount: f64, rate: f64) -> Result<f64> {
        validate_pair(from, to)?;
        validate_quote_amount(amount)?;
        validate_rate(rate)?;
        Ok(match from {
            Asset::A => amount / rate,
            Asset::B => amount * rate,
        })
    }

    /// `fraction` of the current `asset` balance (the 25% / 50% / max
    /// shortcuts of the swap form).
    pub fn fraction_of(&self, asset: Asset, fraction: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(EngineError::InvalidProportion(fraction));
        }
        Ok(self.wallet.balance(asset) * fraction)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Wallet::default())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn receive_for(from: Asset, amount: f64, rate: f64) -> f64 {
    match from {
        Asset::A => amount * rate,
        Asset::B => amount / rate,
    }
}

fn validate_pair(from: Asset, to: Asset) -> Result<()> {
    if from == to {
        return Err(EngineError::InvalidSwapPair(from));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::InvalidSwapAmount(amount.to_string()));
    }
    Ok(())
}

fn validate_quote_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::InvalidSwapAmount(amount.to_string()));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::InvalidExchangeRate(rate));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const PRICE: f64 = 420.69;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_buy_full_balance_scenario() {
        let mut ledger = Ledger::new(Wallet::new(0.0069, 420.0));
        let receipt = ledger.convert(Asset::B, Asset::A, 420.0, PRICE).unwrap();
        assert_eq!(receipt.applied_amount, 420.0);
        assert!(close(receipt.received_amount, 420.0 / PRICE));
        let wallet = ledger.wallet();
        assert!(close(wallet.asset_a, 0.0069 + 420.0 / PRICE));
        assert_eq!(wallet.asset_b, 0.0);
    }

    #[test]
    fn test_sell_uses_multiplication() {
        let mut ledger = Ledger::new(Wallet::new(2.0, 0.0));
        let receipt = ledger.convert(Asset::A, Asset::B, 0.5, 100.0).unwrap();
        assert_eq!(receipt.received_amount, 50.0);
        assert_eq!(ledger.wallet(), Wallet::new(1.5, 50.0));
    }

    #[test]
    fn test_oversized_request_is_clamped() {
        let mut ledger = Ledger::new(Wallet::new(1.0, 10.0));
        let receipt = ledger.convert(Asset::B, Asset::A, 25.0, 5.0).unwrap();
        assert!(receipt.was_clamped());
        assert_eq!(receipt.requested_amount, 25.0);
        assert_eq!(receipt.applied_amount, 10.0);
        assert_eq!(ledger.wallet(), Wallet::new(3.0, 0.0));
    }

    #[test]
    fn test_empty_source_applies_nothing() {
        let mut ledger = Ledger::new(Wallet::new(0.0, 10.0));
        let receipt = ledger.convert(Asset::A, Asset::B, 1.0, 5.0).unwrap();
        assert_eq!(receipt.applied_amount, 0.0);
        assert_eq!(receipt.received_amount, 0.0);
        assert_eq!(ledger.wallet(), Wallet::new(0.0, 10.0));
    }

    #[test]
    fn test_same_asset_rejected() {
        let mut ledger = Ledger::default();
        let before = ledger.wallet();
        let err = ledger.convert(Asset::A, Asset::A, 1.0, PRICE).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSwapPair(Asset::A)));
        assert_eq!(ledger.wallet(), before);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut ledger = Ledger::default();
        let before = ledger.wallet();
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ledger.convert(Asset::B, Asset::A, amount, PRICE).unwrap_err();
            assert!(matches!(err, EngineError::InvalidSwapAmount(_)), "amount {}", amount);
        }
        assert_eq!(ledger.wallet(), before);
    }

    #[test]
    fn test_bad_rate_rejected() {
        let mut ledger = Ledger::default();
        assert!(matches!(
            ledger.convert(Asset::B, Asset::A, 1.0, 0.0),
            Err(EngineError::InvalidExchangeRate(_))
        ));
    }

    #[test]
    fn test_round_trip_restores_wallet() {
        let start = Wallet::new(3.5, 1200.0);
        let mut ledger = Ledger::new(start);
        let sold = ledger.convert(Asset::A, Asset::B, 1.25, PRICE).unwrap();
        ledger.convert(Asset::B, Asset::A, sold.received_amount, PRICE).unwrap();
        let end = ledger.wallet();
        assert!(close(end.asset_a, start.asset_a), "{} vs {}", end.asset_a, start.asset_a);
        assert!(close(end.asset_b, start.asset_b), "{} vs {}", end.asset_b, start.asset_b);
    }

    #[test]
    fn test_conversion_preserves_value() {
        let mut ledger = Ledger::new(Wallet::new(0.7, 300.0));
        let before = ledger.value_in_b(PRICE);
        ledger.convert(Asset::B, Asset::A, 123.45, PRICE).unwrap();
        assert!(close(ledger.value_in_b(PRICE), before));
        assert!(ledger.conservation().balanced);
    }

    #[test]
    fn test_scale() {
        let mut ledger = Ledger::new(Wallet::new(2.0, 100.0));
        assert_eq!(ledger.scale(0.5).unwrap(), Wallet::new(1.0, 50.0));
        assert_eq!(ledger.scale(0.0).unwrap(), Wallet::new(0.0, 0.0));
        assert!(matches!(ledger.scale(-1.0), Err(EngineError::InvalidMultiplier(_))));
        assert!(matches!(ledger.scale(f64::NAN), Err(EngineError::InvalidMultiplier(_))));
    }

    #[test]
    fn test_random_sequences_never_go_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut ledger = Ledger::new(Wallet::new(1.0, 500.0));
        for _ in 0..5_000 {
            let rate = rng.gen_range(0.01..1000.0);
            match rng.gen_range(0..3) {
                0 => {
                    let amount = rng.gen_range(1e-9..2.0);
                    ledger.convert(Asset::A, Asset::B, amount, rate).unwrap();
                }
                1 => {
                    let amount = rng.gen_range(1e-9..1000.0);
                    ledger.convert(Asset::B, Asset::A, amount, rate).unwrap();
                }
                _ => {
                    ledger.scale(rng.gen_range(0.0..2.0)).unwrap();
                }
            }
            let wallet = ledger.wallet();
            assert!(wallet.asset_a >= 0.0 && wallet.asset_b >= 0.0);
        }
        assert!(ledger.conservation_law().is_clean());
    }

    #[test]
    fn test_quotes() {
        assert!(close(Ledger::quote_receive(Asset::B, Asset::A, 420.69, PRICE).unwrap(), 1.0));
        assert!(close(Ledger::quote_receive(Asset::A, Asset::B, 2.0, PRICE).unwrap(), 841.38));
        assert!(close(Ledger::quote_spend(Asset::B, Asset::A, 1.0, PRICE).unwrap(), PRICE));
        assert!(close(Ledger::quote_spend(Asset::A, Asset::B, PRICE, PRICE).unwrap(), 1.0));
        assert!(Ledger::quote_receive(Asset::B, Asset::B, 1.0, PRICE).is_err());
    }

    #[test]
    fn test_fraction_of() {
        let ledger = Ledger::new(Wallet::new(2.0, 100.0));
        assert_eq!(ledger.fraction_of(Asset::B, 0.25).unwrap(), 25.0);
        assert_eq!(ledger.fraction_of(Asset::A, 1.0).unwrap(), 2.0);
        assert!(ledger.fraction_of(Asset::A, 1.5).is_err());
    }
}
