// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Engine Core

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::auto_trade::AutoTradeController;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::indicator::{latest_sma, sma, Trend};
use crate::ledger::Ledger;
use crate::price::PriceProcess;
use crate::schedule::{Schedule, TimerKind};
use crate::stake::{StakeController, StakeOutcome};
use crate::types::*;

// ─── TradingEngine struct ────────────────────────────────────────────────────

/// One player session: the price chart, the wallet, the staking lock and
/// the auto-trader, all advanced by host-driven ticks.
#[wasm_bindgen]
pub struct TradingEngine {
    pub(crate) price: PriceProcess,
    pub(crate) ledger: Ledger,
    pub(crate) stake: StakeController,
    pub(crate) auto_trade: AutoTradeController,
    pub(crate) schedule: Schedule,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) config: EngineConfig,
    pub(crate) seed: u64,
    pub(crate) running: bool,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl TradingEngine {
    /// Engine with a validated `config`, seeded history and starting wallet.
    pub fn with_config(config: EngineConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    pub(crate) fn build(config: EngineConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let price = PriceProcess::seeded(config.price.clone(), &mut rng);
        let ledger = Ledger::new(config.wallet.starting);
        let stake = StakeController::new(config.stake.clone());
        let auto_trade = AutoTradeController::new(config.auto_trade.initial, config.auto_trade.sma_period);
        let schedule = Schedule::new(&config.cadence);

        tracing::info!(
            seed,
            price = price.current_price(),
            a = ledger.wallet().asset_a,
            b = ledger.wallet().asset_b,
            "trading engine started"
        );

        Self {
            price,
            ledger,
            stake,
            auto_trade,
            schedule,
            rng,
            config,
            seed,
            running: true,
        }
    }

    /// Back to the starting state with the same config and seed.
    pub fn reset(&mut self) {
        *self = Self::build(self.config.clone(), self.seed);
    }

    /// Back to the starting state under a new seed.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::build(self.config.clone(), seed);
    }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

impl TradingEngine {
    /// Everything the presentation layer renders, copied out.
    pub fn get_snapshot(&self) -> EngineSnapshot {
        let current_price = self.price.current_price();
        let period = self.auto_trade.sma_period();
        let history = self.price.history();
        let latest = latest_sma(history.iter().copied(), period);

        EngineSnapshot {
            current_price,
            previous_price: self.price.previous_price(),
            price_change: self.price.price_change(),
            volatility: self.price.volatility(),
            history: self.price.history_vec(),
            sma: sma(history.iter().copied(), period),
            trend: Trend::classify(current_price, latest),
            wallet: self.ledger.wallet(),
            wallet_value_b: self.ledger.value_in_b(current_price),
            stake_lock: self.stake.lock_view(),
            auto_trade: self.auto_trade.settings(),
            notice: self.stake.notice().map(str::to_owned),
            conservation: self.ledger.conservation(),
            running: self.running,
        }
    }

    pub fn current_price(&self) -> f64 {
        self.price.current_price()
    }

    pub fn wallet(&self) -> Wallet {
        self.ledger.wallet()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn price_process(&self) -> &PriceProcess {
        &self.price
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stake(&self) -> &StakeController {
        &self.stake
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// What a swap of `amount` would yield at the current price.
    pub fn quote(&self, from: Asset, to: Asset, amount: f64) -> Result<f64> {
        Ledger::quote_receive(from, to, amount, self.price.current_price())
    }

    /// What must be spent to receive `amount` at the current price.
    pub fn quote_spend(&self, from: Asset, to: Asset, amount: f64) -> Result<f64> {
        Ledger::quote_spend(from, to, amount, self.price.current_price())
    }

    pub fn fraction_of(&self, asset: Asset, fraction: f64) -> Result<f64> {
        self.ledger.fraction_of(asset, fraction)
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

impl TradingEngine {
    /// Swap at the current price. Oversized requests are clamped to the
    /// available balance.
    pub fn manual_swap(&mut self, from: Asset, to: Asset, amount: f64) -> Result<SwapReceipt> {
        self.ledger.convert(from, to, amount, self.price.current_price())
    }

    /// [`manual_swap`](Self::manual_swap) with the amount as typed by the
    /// player.
    pub fn manual_swap_str(&mut self, from: Asset, to: Asset, amount: &str) -> Result<SwapReceipt> {
        let parsed: f64 = amount
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidSwapAmount(amount.to_string()))?;
        self.manual_swap(from, to, parsed)
    }

    /// Start a stake with an outcome drawn from the engine's own PRNG.
    /// Ignored while a stake is pending or after shutdown.
    pub fn trigger_stake(&mut self) -> Option<StakeOutcome> {
        if !self.running {
            return None;
        }
        self.stake.trigger(&mut self.rng).cloned()
    }

    /// Start a stake drawing from a caller-supplied random source.
    pub fn trigger_stake_using<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<StakeOutcome> {
        if !self.running {
            return None;
        }
        self.stake.trigger(rng).cloned()
    }

    /// Start a stake with a fixed outcome.
    pub fn trigger_stake_with(&mut self, outcome: StakeOutcome) -> Option<StakeOutcome> {
        if !self.running {
            return None;
        }
        self.stake.trigger_with(outcome).cloned()
    }

    /// Drop the pending stake without applying it.
    pub fn cancel_stake(&mut self) -> Option<StakeOutcome> {
        self.stake.cancel()
    }

    pub fn acknowledge_notice(&mut self) -> Option<String> {
        self.stake.acknowledge_notice()
    }

    pub fn set_auto_trade(&mut self, enabled: bool, proportion: f64) -> Result<()> {
        self.auto_trade.set_config(enabled, proportion)
    }

    /// Stop every timer and abandon any pending stake. Later ticks and
    /// `advance` calls do nothing.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.schedule.stop();
        let dropped = self.stake.cancel();
        tracing::info!(stake_dropped = dropped.is_some(), "trading engine shut down");
    }
}

// ─── Tick transitions ────────────────────────────────────────────────────────

impl TradingEngine {
    /// Price tick at wall-clock time `now_secs` (phase of the bias terms).
    /// A non-finite time ticks with zero bias.
    pub fn tick_price(&mut self, now_secs: f64) -> Option<PriceTick> {
        if !self.running {
            return None;
        }
        Some(self.price.tick(&mut self.rng, now_secs))
    }

    /// One second of stake countdown.
    pub fn tick_stake(&mut self) -> Option<StakeResolution> {
        if !self.running {
            return None;
        }
        self.stake.tick(&mut self.ledger)
    }

    pub fn tick_auto_trade(&mut self) -> Option<AutoTradeFill> {
        if !self.running {
            return None;
        }
        self.auto_trade.evaluate(&self.price, &self.stake, &mut self.ledger)
    }

    /// Scale both balances by `multiplier`, as an external drain would.
    pub fn tick_drain(&mut self, multiplier: f64) -> Result<Option<Wallet>> {
        if !self.running {
            return Ok(None);
        }
        let wallet = self.ledger.scale(multiplier)?;
        tracing::debug!(multiplier, "drain applied");
        Ok(Some(wallet))
    }

    /// Run every transition the schedule says is owed up to `now_ms`.
    ///
    /// The first call only anchors the schedule.
    pub fn advance(&mut self, now_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        if !self.running {
            return report;
        }

        for firing in self.schedule.due(now_ms) {
            match firing.kind {
                TimerKind::Price => {
                    if let Some(tick) = self.tick_price(firing.at_ms as f64 / 1000.0) {
                        report.price_ticks.push(tick);
                    }
                }
                TimerKind::Stake => {
                    if let Some(resolution) = self.tick_stake() {
                        report.stake_resolutions.push(resolution);
                    }
                }
                TimerKind::AutoTrade => {
                    if let Some(fill) = self.tick_auto_trade() {
                        report.auto_trades.push(fill);
                    }
                }
                TimerKind::Drain => {
                    let Some(drain) = self.config.cadence.drain else { continue };
                    match self.tick_drain(drain.multiplier) {
                        Ok(Some(_)) => report.drains += 1,
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "drain rejected"),
                    }
                }
            }
        }
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
