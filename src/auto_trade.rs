// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Auto-Trade Policy

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::indicator::{latest_sma, Trend};
use crate::ledger::Ledger;
use crate::price::PriceProcess;
use crate::stake::StakeController;
use crate::types::{Asset, AutoTradeFill, AutoTradeSettings, Wallet};

/// A swap the policy wants to make: `amount` of `from` into its other side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeIntent {
    pub from: Asset,
    pub to: Asset,
    pub amount: f64,
}

/// Crossover rule: buy `A` above the SMA, sell it below, hold on equality.
/// Returns `None` when there is nothing to do, including zero amounts.
pub fn decide(price: f64, sma: Option<f64>, proportion: f64, wallet: &Wallet) -> Option<TradeIntent> {
    // buy A above the average, sell it below
    let from = match Trend::classify(price, sma) {
        Trend::Above => Asset::B,
        Trend::Below => Asset::A,
        Trend::Flat | Trend::Unknown => return None,
    };
    let amount = proportion * wallet.balance(from);
    if !(amount > 0.0) {
        return None;
    }
    Some(TradeIntent { from, to: from.other(), amount })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoTradeController {
    settings: AutoTradeSettings,
    sma_period: usize,
}

impl AutoTradeController {
    pub fn new(settings: AutoTradeSettings, sma_period: usize) -> Self {
        Self { settings, sma_period }
    }

    pub fn settings(&self) -> AutoTradeSettings {
        self.settings
    }

    pub fn sma_period(&self) -> usize {
        self.sma_period
    }

    pub fn set_config(&mut self, enabled: bool, proportion: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&proportion) {
            return Err(EngineError::InvalidProportion(proportion));
        }
        self.settings = AutoTradeSettings { enabled, proportion };
        tracing::debug!(enabled, proportion, "auto-trade updated");
        Ok(())
    }

    /// One policy tick. Issues at most one swap, and none at all while
    /// automation is off or a stake is pending.
    pub fn evaluate(
        &self,
        price: &PriceProcess,
        stake: &StakeController,
        ledger: &mut Ledger,
    ) -> Option<AutoTradeFill> {
        if !self.settings.enabled || stake.is_locked() {
            return None;
        }

        let current = price.current_price();
        let sma = latest_sma(price.history().iter().copied(), self.sma_period);
        let intent = decide(current, sma, self.settings.proportion, &ledger.wallet())?;
        let sma = sma?;

        match ledger.convert(intent.from, intent.to, intent.amount, current) {
            Ok(receipt) => {
                tracing::debug!(
                    price = current,
                    sma,
                    from = %intent.from,
                    amount = receipt.applied_amount,
                    "auto-trade fill"
                );
                Some(AutoTradeFill { price: current, sma, receipt })
            }
            Err(e) => {
                tracing::warn!(error = %e, "auto-trade swap rejected");
                None
            }
        }
    }
}

impl Default for AutoTradeController {
    fn default() -> Self {
        Self::new(AutoTradeSettings::default(), 20)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
