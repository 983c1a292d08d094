// Monte Carlo Infrastructure - N seeded sessions per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use hit_engine::{Asset, TradingEngine};

use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Host clock step. Finer than every cadence so no timer is ever late by
/// more than one step.
const STEP_MS: u64 = 250;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> anyhow::Result<BenchResult> {
    let start = Instant::now();
    let mut engine = TradingEngine::with_config(scenario.engine_config(), seed)?;

    if let Some(proportion) = scenario.auto_trade {
        engine.set_auto_trade(true, proportion)?;
    }

    let starting = engine.wallet();
    let starting_value_b = engine.get_snapshot().wallet_value_b;

    if let Some(fraction) = scenario.opening_buy {
        let amount = engine.fraction_of(Asset::B, fraction)?;
        if amount > 0.0 {
            engine.manual_swap(Asset::B, Asset::A, amount)?;
        }
    }

    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    let mut price_ticks = 0u64;
    let mut auto_trades = 0u32;
    let mut stakes_started = 0u32;
    let mut stake_successes = 0u32;
    let mut stake_failures = 0u32;
    let mut drains = 0u32;
    let mut min_price = engine.current_price();
    let mut max_price = engine.current_price();
    let mut peak_value = starting_value_b;
    let mut max_drawdown_pct: f64 = 0.0;
    let mut negative_balance_seen = false;

    let end_ms = scenario.duration_secs * 1000;
    let mut now_ms = 0;
    while now_ms <= end_ms {
        if let Some(every) = scenario.stake_every_secs {
            let on_cadence = now_ms % (every * 1000) == 0;
            if on_cadence && !engine.stake().is_locked() && engine.trigger_stake().is_some() {
                stakes_started += 1;
            }
        }

        let report = engine.advance(now_ms);
        price_ticks += report.price_ticks.len() as u64;
        auto_trades += report.auto_trades.len() as u32;
        drains += report.drains;
        for resolution in &report.stake_resolutions {
            if resolution.is_failure {
                stake_failures += 1;
                engine.acknowledge_notice();
            } else {
                stake_successes += 1;
            }
        }
        for tick in &report.price_ticks {
            min_price = min_price.min(tick.price);
            max_price = max_price.max(tick.price);
        }

        let snapshot = engine.get_snapshot();
        let wallet = snapshot.wallet;
        if wallet.asset_a < 0.0 || wallet.asset_b < 0.0 {
            negative_balance_seen = true;
        }
        peak_value = peak_value.max(snapshot.wallet_value_b);
        if peak_value > 0.0 {
            let drawdown = (peak_value - snapshot.wallet_value_b) / peak_value * 100.0;
            max_drawdown_pct = max_drawdown_pct.max(drawdown);
        }

        if let Some(ts) = time_series.as_mut() {
            if now_ms % 1000 == 0 {
                ts.record(now_ms, &snapshot);
            }
        }

        now_ms += STEP_MS;
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        match ts.write_jsonl(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), points = ts.len(), "time series written"),
            Err(e) => tracing::warn!(error = %e, "failed to write time series"),
        }
    }

    let snapshot = engine.get_snapshot();
    let final_value_b = snapshot.wallet_value_b;
    let return_pct = if starting_value_b > 0.0 {
        (final_value_b / starting_value_b - 1.0) * 100.0
    } else {
        0.0
    };

    let audit = engine.ledger().conservation_law();
    let (conservation_checks, conservation_violations, audit_clean) =
        (audit.checks, audit.violations, audit.is_clean());
    let max_conservation_error = if starting_value_b > 0.0 {
        audit.max_error / starting_value_b
    } else {
        audit.max_error
    };

    // Evaluate pass/fail
    let mut pass = !negative_balance_seen && max_conservation_error <= scenario.criteria.max_conservation_error;
    if scenario.criteria.require_clean_audit && !audit_clean {
        pass = false;
    }
    if let Some(ratio) = scenario.criteria.expected_balance_ratio {
        let wallet = engine.wallet();
        let close = |now: f64, then: f64| (now - then * ratio).abs() <= 1e-9 * then.max(1.0);
        if !close(wallet.asset_a, starting.asset_a) || !close(wallet.asset_b, starting.asset_b) {
            pass = false;
        }
    }

    engine.shutdown();

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        duration_secs: scenario.duration_secs,
        price_ticks,
        final_price: snapshot.current_price,
        min_price,
        max_price,
        starting_value_b,
        final_value_b,
        return_pct,
        max_drawdown_pct,
        auto_trades,
        stakes_started,
        stake_successes,
        stake_failures,
        drains,
        conservation_checks,
        conservation_violations,
        max_conservation_error,
        negative_balance_seen,
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> anyhow::Result<MonteCarloReport> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(scenario, seed, ts_dir.as_deref())?);
    }

    Ok(aggregate(scenario, results))
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    let collect = |f: fn(&BenchResult) -> f64| Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>());

    let return_pct = collect(|r| r.return_pct);
    let max_drawdown_pct = collect(|r| r.max_drawdown_pct);
    let final_price = collect(|r| r.final_price);
    let auto_trades = collect(|r| r.auto_trades as f64);
    let stake_failure_rate = collect(|r| {
        let resolved = r.stake_successes + r.stake_failures;
        if resolved > 0 { r.stake_failures as f64 / resolved as f64 } else { 0.0 }
    });
    let max_conservation_error = collect(|r| r.max_conservation_error);
    let elapsed_ms = collect(|r| r.elapsed_ms as f64);

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        return_pct,
        max_drawdown_pct,
        final_price,
        auto_trades,
        stake_failure_rate,
        max_conservation_error,
        elapsed_ms,
        individual_runs: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::scenarios;

    fn by_name(name: &str) -> Scenario {
        scenarios().into_iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_hold_keeps_balances() {
        let mut scenario = by_name("HOLD");
        scenario.duration_secs = 30;
        let result = run_single(&scenario, 1, None).unwrap();
        assert!(result.pass);
        assert_eq!(result.price_ticks, 60);
        assert_eq!(result.conservation_checks, 0);
    }

    #[test]
    fn test_drain_scenario_passes() {
        let result = run_single(&by_name("DRAIN"), 4, None).unwrap();
        assert_eq!(result.drains, 10);
        assert!(result.pass);
    }

    #[test]
    fn test_audit_counts_survive_shutdown() {
        let mut scenario = by_name("BUY_AND_HOLD");
        scenario.duration_secs = 5;
        let result = run_single(&scenario, 3, None).unwrap();
        assert_eq!(result.conservation_checks, 1);
        assert_eq!(result.conservation_violations, 0);
        assert!(result.pass);
    }

    #[test]
    fn test_stake_loop_resolves_stakes() {
        let mut scenario = by_name("STAKE_LOOP");
        scenario.duration_secs = 300;
        let result = run_single(&scenario, 9, None).unwrap();
        assert!(result.stakes_started > 0);
        assert!(result.stake_successes + result.stake_failures >= result.stakes_started - 1);
        assert!(!result.negative_balance_seen);
    }

    #[test]
    fn test_monte_carlo_aggregates_runs() {
        let mut scenario = by_name("AUTO_10");
        scenario.duration_secs = 60;
        let report = run_monte_carlo(&scenario, 3, 100, None).unwrap();
        assert_eq!(report.n_runs, 3);
        assert_eq!(report.individual_runs.len(), 3);
        assert_eq!(report.individual_runs[2].seed, 102);
        assert_eq!(report.return_pct.n, 3);
    }
}
