// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Tick Schedule

//! Cadence bookkeeping for host-driven timers.
//!
//! The engine never sleeps. A host either runs its own intervals and calls
//! the `tick_*` transitions directly, or calls `advance(now_ms)` and lets
//! the [`Schedule`] work out which transitions are owed since the last call.

use serde::{Deserialize, Serialize};

use crate::config::CadenceConfig;

/// Most periods a single timer may owe in one [`Schedule::due`] call.
/// Older missed periods are dropped.
pub const MAX_CATCH_UP: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    Price,
    Stake,
    AutoTrade,
    Drain,
}

/// A transition owed at `at_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firing {
    pub kind: TimerKind,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    kind: TimerKind,
    interval_ms: u64,
    next_due_ms: u64,
    /// Set once `next_due_ms` has saturated at `u64::MAX`.
    #[serde(default)]
    exhausted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Tie-break order: earlier entries fire first at equal due times.
    timers: Vec<Timer>,
    anchored: bool,
    stopped: bool,
}

impl Schedule {
    pub fn new(cadence: &CadenceConfig) -> Self {
        let mut timers = vec![
            Timer { kind: TimerKind::Price, interval_ms: cadence.price_ms, next_due_ms: 0, exhausted: false },
            Timer { kind: TimerKind::Stake, interval_ms: cadence.stake_ms, next_due_ms: 0, exhausted: false },
            Timer { kind: TimerKind::AutoTrade, interval_ms: cadence.auto_trade_ms, next_due_ms: 0, exhausted: false },
        ];
        if let Some(drain) = cadence.drain {
            timers.push(Timer { kind: TimerKind::Drain, interval_ms: drain.interval_ms, next_due_ms: 0, exhausted: false });
        }
        // zero intervals would never advance
        timers.retain(|t| t.interval_ms > 0);
        Self { timers, anchored: false, stopped: false }
    }

    /// Pin every timer's first firing one interval after `now_ms`.
    /// [`due`](Self::due) anchors implicitly on its first call.
    pub fn start(&mut self, now_ms: u64) {
        for timer in &mut self.timers {
            timer.next_due_ms = now_ms.saturating_add(timer.interval_ms);
            timer.exhausted = false;
        }
        self.anchored = true;
    }

    /// Every firing owed up to and including `now_ms`, in time order.
    ///
    /// Missed periods are caught up one by one so that, for example, a host
    /// that stalls for two seconds still sees four price ticks. Ties go to
    /// the timer declared first (price, stake, auto-trade, drain).
    ///
    /// A timer never owes more than [`MAX_CATCH_UP`] periods per call. After
    /// a longer stall only the most recent periods fire.
    pub fn due(&mut self, now_ms: u64) -> Vec<Firing> {
        if self.stopped {
            return Vec::new();
        }
        if !self.anchored {
            self.start(now_ms);
            return Vec::new();
        }

        for timer in &mut self.timers {
            if timer.exhausted || timer.next_due_ms > now_ms {
                continue;
            }
            let owed = (now_ms - timer.next_due_ms) / timer.interval_ms + 1;
            if owed > MAX_CATCH_UP {
                let skipped = owed - MAX_CATCH_UP;
                timer.next_due_ms += skipped * timer.interval_ms;
                tracing::debug!(kind = ?timer.kind, skipped, "dropping missed periods");
            }
        }

        let mut firings = Vec::new();
        loop {
            let next = self
                .timers
                .iter_mut()
                .enumerate()
                .filter(|(_, t)| !t.exhausted && t.next_due_ms <= now_ms)
                .min_by_key(|(i, t)| (t.next_due_ms, *i))
                .map(|(_, t)| t);
            let Some(timer) = next else { break };
            firings.push(Firing { kind: timer.kind, at_ms: timer.next_due_ms });
            match timer.next_due_ms.checked_add(timer.interval_ms) {
                Some(next_due) => timer.next_due_ms = next_due,
                None => timer.exhausted = true,
            }
        }
        firings
    }

    /// Next time anything is due, or `None` once stopped.
    pub fn next_due_ms(&self) -> Option<u64> {
        if self.stopped {
            return None;
        }
        self.timers.iter().filter(|t| !t.exhausted).map(|t| t.next_due_ms).min()
    }

    pub fn interval_ms(&self, kind: TimerKind) -> Option<u64> {
        self.timers.iter().find(|t| t.kind == kind).map(|t| t.interval_ms)
    }

    /// Tear the schedule down. Nothing fires afterwards.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
