// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Staking Lock

//! Timed staking lock.
//!
//! ```text
//!   Idle ──trigger──▶ Locked(outcome, remaining) ──tick × lock_seconds──▶ Idle
//!                           │                                   (wallet scaled)
//!                           └──────────────cancel──────────────▶ Idle
//!                                                              (nothing applied)
//! ```
//!
//! The outcome is drawn when the stake starts and only applied when the
//! countdown reaches zero. At most one stake is in flight.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::StakeConfig;
use crate::ledger::Ledger;
use crate::types::{StakeLockView, StakeResolution};

// ---------------------------------------------------------------------------
// StakeOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakeOutcome {
    pub multiplier: f64,
    pub is_failure: bool,
    pub lock_seconds: u32,
    pub message: Option<String>,
}

/// Pick an outcome from three unit draws.
///
/// * `roll` decides failure (`roll < failure_probability`) vs success;
/// * `pick` selects the success tier, uniformly;
/// * `message_pick` selects the failure message, uniformly.
///
/// Draws are expected in `[0, 1)`; values at or above 1 select the last
/// entry. With no tiers configured a success is neutral: multiplier 1 over
/// the failure lock.
pub fn select_outcome(config: &StakeConfig, roll: f64, pick: f64, message_pick: f64) -> StakeOutcome {
    if roll < config.failure_probability {
        let message = config
            .failure_messages
            .get(uniform_index(message_pick, config.failure_messages.len()))
            .cloned();
        StakeOutcome {
            multiplier: config.failure_multiplier,
            is_failure: true,
            lock_seconds: config.failure_lock_seconds,
            message,
        }
    } else {
        let (multiplier, lock_seconds) = match config.tiers.get(uniform_index(pick, config.tiers.len())) {
            Some(tier) => (tier.multiplier, tier.lock_seconds),
            None => (1.0, config.failure_lock_seconds),
        };
        StakeOutcome {
            multiplier,
            is_failure: false,
            lock_seconds,
            message: None,
        }
    }
}

fn uniform_index(draw: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((draw.max(0.0) * len as f64) as usize).min(len - 1)
}

/// Draw an outcome with `rng`. Roll and tier pick are independent draws.
pub fn sample_outcome<R: Rng + ?Sized>(config: &StakeConfig, rng: &mut R) -> StakeOutcome {
    let roll: f64 = rng.gen();
    let pick: f64 = rng.gen();
    let message_pick: f64 = rng.gen();
    select_outcome(config, roll, pick, message_pick)
}

// ---------------------------------------------------------------------------
// StakeController
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StakeState {
    Idle,
    Locked { outcome: StakeOutcome, remaining: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeController {
    state: StakeState,
    notice: Option<String>,
    config: StakeConfig,
}

impl StakeController {
    pub fn new(config: StakeConfig) -> Self {
        Self {
            state: StakeState::Idle,
            notice: None,
            config,
        }
    }

    pub fn state(&self) -> &StakeState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, StakeState::Locked { .. })
    }

    pub fn remaining_seconds(&self) -> u32 {
        match &self.state {
            StakeState::Idle => 0,
            StakeState::Locked { remaining, .. } => *remaining,
        }
    }

    pub fn pending_outcome(&self) -> Option<&StakeOutcome> {
        match &self.state {
            StakeState::Idle => None,
            StakeState::Locked { outcome, .. } => Some(outcome),
        }
    }

    /// Start a stake with a freshly drawn outcome. Returns `None` and
    /// leaves the current lock alone if one is already pending.
    pub fn trigger<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&StakeOutcome> {
        if self.is_locked() {
            tracing::debug!(remaining = self.remaining_seconds(), "stake trigger ignored: already locked");
            return None;
        }
        let outcome = sample_outcome(&self.config, rng);
        self.lock(outcome)
    }

    /// Start a stake with a predetermined outcome. Same locking rules as
    /// [`trigger`](Self::trigger).
    pub fn trigger_with(&mut self, outcome: StakeOutcome) -> Option<&StakeOutcome> {
        if self.is_locked() {
            return None;
        }
        self.lock(outcome)
    }

    fn lock(&mut self, outcome: StakeOutcome) -> Option<&StakeOutcome> {
        tracing::debug!(
            multiplier = outcome.multiplier,
            lock_seconds = outcome.lock_seconds,
            is_failure = outcome.is_failure,
            "stake locked"
        );
        let remaining = outcome.lock_seconds.max(1);
        self.state = StakeState::Locked { outcome, remaining };
        self.pending_outcome()
    }

    /// One-second countdown. When the lock reaches zero the outcome is
    /// applied to `ledger` and returned; otherwise `None`.
    pub fn tick(&mut self, ledger: &mut Ledger) -> Option<StakeResolution> {
        let StakeState::Locked { remaining, .. } = &mut self.state else {
            return None;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return None;
        }

        let StakeState::Locked { outcome, .. } = std::mem::replace(&mut self.state, StakeState::Idle)
        else {
            return None;
        };

        let wallet = match ledger.scale(outcome.multiplier) {
            Ok(wallet) => wallet,
            Err(e) => {
                // Config validation keeps multipliers positive; nothing to apply otherwise
                tracing::warn!(error = %e, "stake outcome could not be applied");
                ledger.wallet()
            }
        };
        if outcome.is_failure {
            self.notice = Some(
                outcome
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            );
        }
        tracing::info!(
            multiplier = outcome.multiplier,
            is_failure = outcome.is_failure,
            a = wallet.asset_a,
            b = wallet.asset_b,
            "stake resolved"
        );

        Some(StakeResolution {
            multiplier: outcome.multiplier,
            is_failure: outcome.is_failure,
            message: outcome.message,
            wallet,
        })
    }

    /// Abandon the pending stake without applying it. Returns the dropped
    /// outcome, if any.
    pub fn cancel(&mut self) -> Option<StakeOutcome> {
        match std::mem::replace(&mut self.state, StakeState::Idle) {
            StakeState::Idle => None,
            StakeState::Locked { outcome, remaining } => {
                tracing::debug!(remaining, "stake cancelled");
                Some(outcome)
            }
        }
    }

    /// Failure message waiting for the player, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Dismiss the failure notice. Returns the message that was shown.
    pub fn acknowledge_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Reward figure for the lock display. Failures show the decoy figure.
    pub fn expected_reward_pct(&self) -> Option<f64> {
        self.pending_outcome().map(|outcome| {
            if outcome.is_failure {
                self.config.failure_decoy_reward_pct
            } else {
                (outcome.multiplier - 1.0) * 100.0
            }
        })
    }

    pub fn lock_view(&self) -> Option<StakeLockView> {
        let outcome = self.pending_outcome()?;
        Some(StakeLockView {
            remaining_seconds: self.remaining_seconds(),
            lock_seconds: outcome.lock_seconds,
            expected_reward_pct: self.expected_reward_pct().unwrap_or(0.0),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Wallet;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn failure() -> StakeOutcome {
        select_outcome(&StakeConfig::default(), 0.05, 0.0, 0.0)
    }

    #[test]
    fn test_forced_failure_outcome() {
        let outcome = failure();
        assert!(outcome.is_failure);
        assert_eq!(outcome.multiplier, 0.5);
        assert_eq!(outcome.lock_seconds, 10);
        assert_eq!(outcome.message.as_deref(), Some("Validator node failed. Stake slashed!"));
    }

    #[test]
    fn test_success_tiers_by_pick() {
        let config = StakeConfig::default();
        let low = select_outcome(&config, 0.5, 0.1, 0.0);
        let mid = select_outcome(&config, 0.5, 0.5, 0.0);
        let high = select_outcome(&config, 0.5, 0.9, 0.0);
        assert_eq!((low.multiplier, low.lock_seconds), (1.1, 10));
        assert_eq!((mid.multiplier, mid.lock_seconds), (1.4, 30));
        assert_eq!((high.multiplier, high.lock_seconds), (2.0, 60));
        assert!(!high.is_failure && high.message.is_none());
    }

    #[test]
    fn test_roll_boundary() {
        let config = StakeConfig::default();
        assert!(select_outcome(&config, 0.0999, 0.0, 0.0).is_failure);
        assert!(!select_outcome(&config, 0.10, 0.0, 0.0).is_failure);
    }

    #[test]
    fn test_message_pick_is_uniform_index() {
        let config = StakeConfig::default();
        let last = select_outcome(&config, 0.0, 0.0, 0.99);
        assert_eq!(last.message.as_deref(), Some("Dex owner rug pulled!"));
        let clamped = select_outcome(&config, 0.0, 0.0, 1.0);
        assert_eq!(clamped.message.as_deref(), Some("Dex owner rug pulled!"));
    }

    #[test]
    fn test_empty_tier_table_is_neutral() {
        let config = StakeConfig { tiers: Vec::new(), ..StakeConfig::default() };
        let outcome = select_outcome(&config, 0.9, 0.5, 0.0);
        assert!(!outcome.is_failure);
        assert_eq!(outcome.multiplier, 1.0);
        assert_eq!(outcome.lock_seconds, config.failure_lock_seconds);

        let mut stake = StakeController::new(config);
        let mut ledger = Ledger::new(Wallet::new(2.0, 100.0));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            stake.trigger(&mut rng);
            while stake.is_locked() {
                stake.tick(&mut ledger);
            }
            stake.acknowledge_notice();
        }
        assert!(ledger.wallet().asset_a > 0.0);
    }

    #[test]
    fn test_sampling_distribution() {
        let config = StakeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 30_000;
        let mut failures = 0;
        let mut tiers = [0u32; 3];
        for _ in 0..n {
            let outcome = sample_outcome(&config, &mut rng);
            if outcome.is_failure {
                failures += 1;
            } else {
                let idx = config.tiers.iter().position(|t| t.multiplier == outcome.multiplier).unwrap();
                tiers[idx] += 1;
            }
        }
        let failure_rate = failures as f64 / n as f64;
        assert!((failure_rate - 0.10).abs() < 0.01, "failure rate {}", failure_rate);
        let successes = (n - failures) as f64;
        for count in tiers {
            let share = count as f64 / successes;
            assert!((share - 1.0 / 3.0).abs() < 0.02, "tier share {}", share);
        }
    }

    #[test]
    fn test_failure_resolves_after_lock() {
        let mut stake = StakeController::new(StakeConfig::default());
        let mut ledger = Ledger::new(Wallet::new(2.0, 100.0));
        stake.trigger_with(failure()).unwrap();

        for _ in 0..9 {
            assert!(stake.tick(&mut ledger).is_none());
            assert_eq!(ledger.wallet(), Wallet::new(2.0, 100.0));
        }
        let resolution = stake.tick(&mut ledger).unwrap();
        assert!(resolution.is_failure);
        assert_eq!(ledger.wallet(), Wallet::new(1.0, 50.0));
        assert!(!stake.is_locked());
        assert_eq!(stake.notice(), Some("Validator node failed. Stake slashed!"));

        // Further ticks do nothing
        assert!(stake.tick(&mut ledger).is_none());
        assert_eq!(ledger.wallet(), Wallet::new(1.0, 50.0));
    }

    #[test]
    fn test_notice_cleared_only_on_acknowledge() {
        let mut stake = StakeController::new(StakeConfig::default());
        let mut ledger = Ledger::default();
        stake.trigger_with(failure());
        for _ in 0..10 {
            stake.tick(&mut ledger);
        }
        for _ in 0..30 {
            stake.tick(&mut ledger);
        }
        assert!(stake.notice().is_some());
        assert!(stake.acknowledge_notice().is_some());
        assert!(stake.notice().is_none());
        assert!(stake.acknowledge_notice().is_none());
    }

    #[test]
    fn test_retrigger_while_locked_is_ignored() {
        let mut stake = StakeController::new(StakeConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ledger = Ledger::default();
        stake.trigger_with(failure());
        stake.tick(&mut ledger);
        let before = stake.state().clone();

        assert!(stake.trigger(&mut rng).is_none());
        let success = select_outcome(&StakeConfig::default(), 0.9, 0.9, 0.0);
        assert!(stake.trigger_with(success).is_none());
        assert_eq!(stake.state(), &before);
        assert_eq!(stake.remaining_seconds(), 9);
    }

    #[test]
    fn test_cancel_never_applies() {
        let mut stake = StakeController::new(StakeConfig::default());
        let mut ledger = Ledger::new(Wallet::new(1.0, 1.0));
        stake.trigger_with(select_outcome(&StakeConfig::default(), 0.9, 0.9, 0.0));
        for _ in 0..59 {
            stake.tick(&mut ledger);
        }
        let dropped = stake.cancel().unwrap();
        assert_eq!(dropped.multiplier, 2.0);
        for _ in 0..120 {
            assert!(stake.tick(&mut ledger).is_none());
        }
        assert_eq!(ledger.wallet(), Wallet::new(1.0, 1.0));
        assert!(stake.cancel().is_none());
    }

    #[test]
    fn test_expected_reward_display() {
        let mut stake = StakeController::new(StakeConfig::default());
        assert!(stake.lock_view().is_none());
        stake.trigger_with(select_outcome(&StakeConfig::default(), 0.9, 0.5, 0.0));
        let view = stake.lock_view().unwrap();
        assert!((view.expected_reward_pct - 40.0).abs() < 1e-9);
        assert_eq!(view.remaining_seconds, 30);

        stake.cancel();
        stake.trigger_with(failure());
        assert_eq!(stake.expected_reward_pct(), Some(10.0));
    }
}
