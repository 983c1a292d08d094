// Benchmark Report Types
// Structured output for offline analysis of seeded trading sessions

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    /// Half-width of the confidence interval.
    pub fn ci_half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub duration_secs: u64,
    pub price_ticks: u64,
    pub final_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub starting_value_b: f64,
    pub final_value_b: f64,
    /// Final over starting wallet value, in percent change.
    pub return_pct: f64,
    pub max_drawdown_pct: f64,
    pub auto_trades: u32,
    pub stakes_started: u32,
    pub stake_successes: u32,
    pub stake_failures: u32,
    pub drains: u32,
    pub conservation_checks: u64,
    pub conservation_violations: u64,
    pub max_conservation_error: f64,
    pub negative_balance_seen: bool,
    pub elapsed_ms: u128,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub return_pct: Stats,
    pub max_drawdown_pct: Stats,
    pub final_price: Stats,
    pub auto_trades: Stats,
    pub stake_failure_rate: Stats,
    pub max_conservation_error: Stats,
    pub elapsed_ms: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantSummary {
    pub conservation_clean: bool,
    pub balances_non_negative: bool,
    pub max_conservation_error: f64,
}

impl InvariantSummary {
    pub fn from_reports(reports: &[MonteCarloReport]) -> Self {
        let runs = || reports.iter().flat_map(|r| r.individual_runs.iter());
        Self {
            conservation_clean: runs().all(|r| r.conservation_violations == 0),
            balances_non_negative: runs().all(|r| !r.negative_balance_seen),
            max_conservation_error: runs().map(|r| r.max_conservation_error).fold(0.0_f64, f64::max),
        }
    }

    pub fn all_pass(&self) -> bool {
        self.conservation_clean && self.balances_non_negative
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariants: InvariantSummary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
