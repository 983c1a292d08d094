// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Price Process

//! Synthetic price generator.
//!
//! Each tick is a bounded random walk whose step size is itself a slowly
//! wandering volatility, plus a set of sinusoidal bias terms that give the
//! chart short- and long-cycle momentum. The arithmetic lives in
//! [`PriceStep`] so its bounds can be checked against any draws; the
//! [`PriceProcess`] owns the state and the rolling history.

use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BiasTerm, PriceConfig};
use crate::types::{PriceChange, PriceTick};

// ---------------------------------------------------------------------------
// PriceStep - pure arithmetic
// ---------------------------------------------------------------------------

/// Inputs to one price step, with the random draws already taken.
#[derive(Debug, Clone, Copy)]
pub struct PriceStep {
    pub previous: f64,
    pub volatility: f64,
    /// Wall-clock time in seconds, phase of the bias terms.
    pub t_secs: f64,
    /// Volatility nudge in `[-1, 1]`, scaled by `volatility_step`.
    pub volatility_draw: f64,
    /// Walk draw in `[-0.5, 0.5]`.
    pub walk_draw: f64,
}

impl PriceStep {
    /// Returns `(new_price, new_volatility)`.
    pub fn apply(&self, config: &PriceConfig) -> (f64, f64) {
        let volatility = (self.volatility + self.volatility_draw * config.volatility_step)
            .clamp(config.min_volatility, config.max_volatility);

        let random_delta = self.walk_draw * volatility * self.previous;
        let bias: f64 = config
            .bias_terms
            .iter()
            .map(|term| bias_at(term, self.t_secs) * self.previous)
            .sum();

        let price = (self.previous + random_delta + bias).max(config.price_floor);
        (price, volatility)
    }
}

/// Fractional bias contributed by `term` at time `t_secs`. A non-finite
/// time contributes nothing.
pub fn bias_at(term: &BiasTerm, t_secs: f64) -> f64 {
    if !t_secs.is_finite() {
        return 0.0;
    }
    term.amplitude * (2.0 * PI * t_secs / term.period_secs).sin()
}

/// One seeding step: the plain walk with a fixed factor and no bias.
fn seed_step(previous: f64, walk_draw: f64, config: &PriceConfig) -> f64 {
    (previous + walk_draw * config.seed_volatility * previous).max(config.price_floor)
}

// ---------------------------------------------------------------------------
// PriceProcess
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceProcess {
    current_price: f64,
    previous_price: Option<f64>,
    volatility: f64,
    history: VecDeque<f64>,
    config: PriceConfig,
}

impl PriceProcess {
    /// Start at `config.initial_price` with an empty history.
    pub fn new(config: PriceConfig) -> Self {
        let mut history = VecDeque::with_capacity(config.history_capacity);
        history.push_back(config.initial_price);
        Self {
            current_price: config.initial_price,
            previous_price: None,
            volatility: config.initial_volatility,
            history,
            config,
        }
    }

    /// Start with a full synthetic history so the chart and the indicator
    /// have context before the first live tick.
    pub fn seeded<R: Rng + ?Sized>(config: PriceConfig, rng: &mut R) -> Self {
        let history = generate_initial_history(&config, rng);
        let current_price = history.back().copied().unwrap_or(config.initial_price);
        let previous_price = history.iter().rev().nth(1).copied();
        Self {
            current_price,
            previous_price,
            volatility: config.initial_volatility,
            history,
            config,
        }
    }

    /// Resume from a recorded history, oldest first. Points beyond the
    /// configured capacity are dropped from the front; an empty history
    /// falls back to the initial price.
    pub fn from_history(config: PriceConfig, points: impl IntoIterator<Item = f64>) -> Self {
        let mut history: VecDeque<f64> = points
            .into_iter()
            .map(|p| p.max(config.price_floor))
            .collect();
        while history.len() > config.history_capacity {
            history.pop_front();
        }
        if history.is_empty() {
            history.push_back(config.initial_price);
        }
        let current_price = history.back().copied().unwrap_or(config.initial_price);
        let previous_price = history.iter().rev().nth(1).copied();
        Self {
            current_price,
            previous_price,
            volatility: config.initial_volatility,
            history,
            config,
        }
    }

    /// Advance one tick at wall-clock time `t_secs`.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, t_secs: f64) -> PriceTick {
        let step = PriceStep {
            previous: self.current_price,
            volatility: self.volatility,
            t_secs,
            volatility_draw: rng.gen_range(-1.0..=1.0),
            walk_draw: rng.gen_range(-0.5..=0.5),
        };
        let (price, volatility) = step.apply(&self.config);
        self.push(price, volatility)
    }

    fn push(&mut self, price: f64, volatility: f64) -> PriceTick {
        let previous = self.current_price;
        self.previous_price = Some(previous);
        self.current_price = price;
        self.volatility = volatility;

        self.history.push_back(price);
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }

        PriceTick { price, previous_price: previous, volatility }
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn previous_price(&self) -> Option<f64> {
        self.previous_price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Contiguous copy of the history, oldest first.
    pub fn history_vec(&self) -> Vec<f64> {
        self.history.iter().copied().collect()
    }

    pub fn capacity(&self) -> usize {
        self.config.history_capacity
    }

    pub fn price_change(&self) -> Option<PriceChange> {
        self.previous_price
            .map(|previous| PriceChange::between(self.current_price, previous))
    }

    pub fn config(&self) -> &PriceConfig {
        &self.config
    }
}

/// `history_capacity` points: the initial price followed by
/// `history_capacity - 1` unbiased walk steps.
pub fn generate_initial_history<R: Rng + ?Sized>(config: &PriceConfig, rng: &mut R) -> VecDeque<f64> {
    let mut history = VecDeque::with_capacity(config.history_capacity);
    let mut current = config.initial_price;
    history.push_back(current);
    for _ in 1..config.history_capacity {
        current = seed_step(current, rng.gen_range(-0.5..=0.5), config);
        history.push_back(current);
    }
    history
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
