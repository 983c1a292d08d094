// $HIT Session Benchmark Runner
// Monte Carlo over seeded sessions, ChaCha8Rng, per-run invariant audit
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- auto             # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed

mod report;
mod scenarios;
mod monte_carlo;
mod time_series;

use anyhow::Context;
use clap::Parser;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[clap(name = "bench", version, about = "Seeded Monte Carlo sessions of the $HIT trading engine")]
struct Cli {
    /// Runs per scenario
    #[clap(long, default_value_t = 30)]
    runs: usize,

    /// Base seed; run i uses seed + i
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Write a per-second JSONL series for every run
    #[clap(long)]
    time_series: bool,

    /// Override every scenario's session length, in seconds
    #[clap(long)]
    duration: Option<u64>,

    /// Output directory for reports
    #[clap(long, default_value = "benchmark-results")]
    out_dir: PathBuf,

    /// Only run scenarios whose name, label or category contains this
    filter: Option<String>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut all_scenarios = scenarios();
    if let Some(secs) = cli.duration {
        for scenario in &mut all_scenarios {
            scenario.duration_secs = secs;
        }
    }

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        anyhow::bail!("no scenarios match filter: {:?}", cli.filter);
    }

    let ts_dir = cli.time_series.then(|| cli.out_dir.join("time-series"));

    println!("\n  $HIT Session Benchmark Runner");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<30} {:>5} {:>14} {:>9} {:>7} {:>9} {:>7}",
        "Scenario", "Pass%", "Return%", "MaxDD%", "Autos", "Conserv", "Time");
    println!("  {}", "-".repeat(88));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed, ts_dir.as_deref())
            .with_context(|| format!("scenario {} failed", scenario.name))?;

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<30} {:>4}% {:>7.2}±{:<6.2} {:>8.2}% {:>7.0} {:>9.1e} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.return_pct.mean, report.return_pct.ci_half_width(),
            report.max_drawdown_pct.mean,
            report.auto_trades.mean,
            report.max_conservation_error.max,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();
    let invariants = InvariantSummary::from_reports(&mc_reports);

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(88));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    println!("  Invariants:");
    println!("    Conservation clean:    {}", if invariants.conservation_clean { "PASS" } else { "FAIL" });
    println!("    Balances non-negative: {}", if invariants.balances_non_negative { "PASS" } else { "FAIL" });
    println!("    Max norm conservation: {:.2e}\n", invariants.max_conservation_error);

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);
    let all_pass = invariants.all_pass();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariants,
        scenarios: mc_reports,
    };

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;
    let path = cli.out_dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, &json).with_context(|| format!("failed to write {}", path.display()))?;
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 || !all_pass {
        std::process::exit(1);
    }
    Ok(())
}
