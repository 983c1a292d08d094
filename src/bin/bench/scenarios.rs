// Session Scenarios - scripted player behaviour over a seeded engine
// Everything a scenario varies is config or player actions; the engine is untouched

use hit_engine::config::{DrainConfig, EngineConfig};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Simulated wall-clock length of the session.
    pub duration_secs: u64,
    /// Auto-trade proportion, `None` to leave automation off.
    pub auto_trade: Option<f64>,
    /// Re-stake this often whenever no stake is pending.
    pub stake_every_secs: Option<u64>,
    /// Opening manual swap: fraction of `B` converted into `A` at t = 0.
    pub opening_buy: Option<f64>,
    pub drain: Option<DrainConfig>,
    pub criteria: PassCriteria,
}

impl Scenario {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.cadence.drain = self.drain;
        config
    }
}

pub struct PassCriteria {
    /// Largest per-swap relative conservation error tolerated.
    pub max_conservation_error: f64,
    pub require_clean_audit: bool,
    /// Expected final/starting ratio of each balance, for sessions that
    /// never swap.
    pub expected_balance_ratio: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_conservation_error: 1e-9,
            require_clean_audit: true,
            expected_balance_ratio: None,
        }
    }
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "HOLD",
            label: "Hold (no actions)",
            category: "baseline",
            duration_secs: 600,
            auto_trade: None,
            stake_every_secs: None,
            opening_buy: None,
            drain: None,
            criteria: PassCriteria {
                expected_balance_ratio: Some(1.0),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "BUY_AND_HOLD",
            label: "All-in buy, then hold",
            category: "baseline",
            duration_secs: 600,
            auto_trade: None,
            stake_every_secs: None,
            opening_buy: Some(1.0),
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "AUTO_10",
            label: "Auto-trade 10%",
            category: "auto-trade",
            duration_secs: 600,
            auto_trade: Some(0.1),
            stake_every_secs: None,
            opening_buy: None,
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "AUTO_50",
            label: "Auto-trade 50%",
            category: "auto-trade",
            duration_secs: 600,
            auto_trade: Some(0.5),
            stake_every_secs: None,
            opening_buy: None,
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "AUTO_100",
            label: "Auto-trade 100%",
            category: "auto-trade",
            duration_secs: 600,
            auto_trade: Some(1.0),
            stake_every_secs: None,
            opening_buy: None,
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "STAKE_LOOP",
            label: "Stake back-to-back",
            category: "stake",
            duration_secs: 1_800,
            auto_trade: None,
            stake_every_secs: Some(1),
            opening_buy: None,
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "STAKE_AND_AUTO",
            label: "Stake loop + auto-trade 25%",
            category: "combined",
            duration_secs: 1_800,
            auto_trade: Some(0.25),
            stake_every_secs: Some(30),
            opening_buy: Some(0.5),
            drain: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "DRAIN",
            label: "Hold under 1%/min drain",
            category: "drain",
            duration_secs: 600,
            auto_trade: None,
            stake_every_secs: None,
            opening_buy: None,
            drain: Some(DrainConfig { interval_ms: 60_000, multiplier: 0.99 }),
            criteria: PassCriteria {
                expected_balance_ratio: Some(0.99_f64.powi(10)),
                ..PassCriteria::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_unique() {
        let all = scenarios();
        let mut names: Vec<_> = all.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn test_scenario_configs_valid() {
        for scenario in scenarios() {
            assert!(scenario.engine_config().validate().is_ok(), "{}", scenario.name);
            if let Some(p) = scenario.auto_trade {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }
}
