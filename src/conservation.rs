// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Conservation Logic

use serde::{Deserialize, Serialize};

use crate::types::Wallet;

/// Relative tolerance: a swap is balanced when the value drift is below
/// this fraction of the wallet value (or absolute, for tiny wallets).
const TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Free function
// ---------------------------------------------------------------------------

/// Value drift caused by moving from `before` to `after`, both valued in
/// `B` at `rate`.
///
/// A swap only moves value between the two balances, so in a perfect
/// ledger the result is zero.
pub fn compute_conservation(before: &Wallet, after: &Wallet, rate: f64) -> f64 {
    (before.value_in_b(rate) - after.value_in_b(rate)).abs()
}

fn allowed_error(value: f64) -> f64 {
    TOLERANCE * value.abs().max(1.0)
}

// ---------------------------------------------------------------------------
// Conservation result
// ---------------------------------------------------------------------------

/// Outcome of the most recent conservation check plus running totals.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConservationResult {
    /// Whether the last check passed within tolerance.
    pub balanced: bool,
    /// Absolute drift for the last check, in `B`.
    pub error: f64,
    /// Number of checks performed so far.
    pub checks: u64,
    /// Number of checks that violated tolerance.
    pub violations: u64,
}

// ---------------------------------------------------------------------------
// Conservation law
// ---------------------------------------------------------------------------

/// Audits every conversion the ledger performs. Violations are counted
/// and logged; they never block the ledger.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConservationLaw {
    /// Running total of drift across checks that violated tolerance.
    pub cumulative_error: f64,
    /// Largest single drift seen, balanced or not.
    pub max_error: f64,
    pub checks: u64,
    pub violations: u64,
    /// Number of consecutive checks that violated tolerance.
    pub consecutive_violations: u32,
    last_error: f64,
    last_balanced: bool,
}

impl ConservationLaw {
    pub fn new() -> Self {
        Self {
            cumulative_error: 0.0,
            max_error: 0.0,
            checks: 0,
            violations: 0,
            consecutive_violations: 0,
            last_error: 0.0,
            last_balanced: true,
        }
    }

    /// Verify one conversion.
    ///
    /// Invariant: `before.a * rate + before.b == after.a * rate + after.b`
    pub fn verify_conversion(
        &mut self,
        before: &Wallet,
        after: &Wallet,
        rate: f64,
    ) -> ConservationResult {
        let error = compute_conservation(before, after, rate);
        let balanced = error <= allowed_error(before.value_in_b(rate));

        self.checks += 1;
        self.max_error = self.max_error.max(error);
        if balanced {
            self.consecutive_violations = 0;
        } else {
            self.cumulative_error += error;
            self.violations += 1;
            self.consecutive_violations += 1;
            tracing::warn!(
                error,
                rate,
                consecutive = self.consecutive_violations,
                "swap conservation violated"
            );
        }
        self.last_error = error;
        self.last_balanced = balanced;

        self.result()
    }

    pub fn result(&self) -> ConservationResult {
        ConservationResult {
            balanced: self.last_balanced,
            error: self.last_error,
            checks: self.checks,
            violations: self.violations,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ConservationLaw {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_conservation_exact() {
        let before = Wallet::new(1.0, 100.0);
        let after = Wallet::new(0.0, 150.0);
        assert!(compute_conservation(&before, &after, 50.0) < f64::EPSILON);
    }

    #[test]
    fn test_compute_conservation_leakage() {
        let before = Wallet::new(1.0, 100.0);
        let after = Wallet::new(0.0, 145.0);
        assert!((compute_conservation(&before, &after, 50.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_law_is_clean() {
        let law = ConservationLaw::default();
        assert!(law.is_clean());
        assert_eq!(law.checks, 0);
        assert!(law.result().balanced);
    }

    #[test]
    fn test_balanced_conversion() {
        let mut law = ConservationLaw::new();
        let result = law.verify_conversion(
            &Wallet::new(2.0, 0.0),
            &Wallet::new(0.5, 75.0),
            50.0,
        );
        assert!(result.balanced);
        assert_eq!(result.checks, 1);
        assert_eq!(result.violations, 0);
    }

    #[test]
    fn test_violation_is_counted() {
        let mut law = ConservationLaw::new();
        let result = law.verify_conversion(
            &Wallet::new(2.0, 0.0),
            &Wallet::new(0.0, 90.0),
            50.0,
        );
        assert!(!result.balanced);
        assert!((result.error - 10.0).abs() < 1e-12);
        assert_eq!(law.violations, 1);
        assert_eq!(law.consecutive_violations, 1);
        assert!(!law.is_clean());
    }

    #[test]
    fn test_balanced_resets_consecutive() {
        let mut law = ConservationLaw::new();
        law.verify_conversion(&Wallet::new(1.0, 0.0), &Wallet::new(0.0, 1.0), 2.0);
        assert_eq!(law.consecutive_violations, 1);
        law.verify_conversion(&Wallet::new(1.0, 0.0), &Wallet::new(0.0, 2.0), 2.0);
        assert_eq!(law.consecutive_violations, 0);
        assert_eq!(law.violations, 1);
    }

    #[test]
    fn test_rounding_within_tolerance() {
        let mut law = ConservationLaw::new();
        let before = Wallet::new(0.1, 0.2);
        let after = Wallet::new(0.0, 0.1 * 3.0 + 0.2);
        let result = law.verify_conversion(&before, &after, 3.0);
        assert!(result.balanced, "float noise should not count as leakage");
    }

    #[test]
    fn test_reset() {
        let mut law = ConservationLaw::new();
        law.verify_conversion(&Wallet::new(1.0, 0.0), &Wallet::new(0.0, 1.0), 2.0);
        law.reset();
        assert!(law.is_clean());
        assert_eq!(law.checks, 0);
        assert!(law.cumulative_error.abs() < f64::EPSILON);
    }
}
