// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine

pub mod types;
pub mod error;
pub mod config;
pub mod price;
pub mod indicator;
pub mod conservation;
pub mod ledger;
pub mod stake;
pub mod auto_trade;
pub mod schedule;
pub mod engine;

pub use config::EngineConfig;
pub use engine::TradingEngine;
pub use error::{EngineError, Result};
pub use indicator::Trend;
pub use types::*;

use wasm_bindgen::prelude::*;

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn js_err(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_asset(ticker: &str) -> std::result::Result<Asset, JsValue> {
    ticker.parse::<Asset>().map_err(js_err)
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl TradingEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self::build(EngineConfig::default(), seed)
    }

    /// Engine from a JSON config; missing sections keep their defaults.
    #[wasm_bindgen(js_name = from_config)]
    pub fn js_from_config(json: &str, seed: u64) -> std::result::Result<TradingEngine, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = EngineConfig::from_json(json).map_err(js_err)?;
        Ok(Self::build(config, seed))
    }

    pub fn snapshot(&self) -> JsValue {
        to_js(&self.get_snapshot())
    }

    /// Run whatever is due at host time `now_ms`; returns the tick report.
    /// A non-finite time advances nothing.
    #[wasm_bindgen(js_name = advance)]
    pub fn js_advance(&mut self, now_ms: f64) -> JsValue {
        if !now_ms.is_finite() {
            return to_js(&TickReport::default());
        }
        let report = self.advance(now_ms.max(0.0) as u64);
        to_js(&report)
    }

    #[wasm_bindgen(js_name = tick_price)]
    pub fn js_tick_price(&mut self, now_secs: f64) -> JsValue {
        to_js(&self.tick_price(now_secs))
    }

    #[wasm_bindgen(js_name = tick_stake)]
    pub fn js_tick_stake(&mut self) -> JsValue {
        to_js(&self.tick_stake())
    }

    #[wasm_bindgen(js_name = tick_auto_trade)]
    pub fn js_tick_auto_trade(&mut self) -> JsValue {
        to_js(&self.tick_auto_trade())
    }

    /// Swap with the amount exactly as typed into the form.
    #[wasm_bindgen(js_name = manual_swap)]
    pub fn js_manual_swap(&mut self, from: &str, to: &str, amount: &str) -> std::result::Result<JsValue, JsValue> {
        let from = parse_asset(from)?;
        let to = parse_asset(to)?;
        let receipt = self.manual_swap_str(from, to, amount).map_err(js_err)?;
        Ok(to_js(&receipt))
    }

    #[wasm_bindgen(js_name = quote)]
    pub fn js_quote(&self, from: &str, to: &str, amount: f64) -> std::result::Result<f64, JsValue> {
        self.quote(parse_asset(from)?, parse_asset(to)?, amount).map_err(js_err)
    }

    #[wasm_bindgen(js_name = fraction_of)]
    pub fn js_fraction_of(&self, asset: &str, fraction: f64) -> std::result::Result<f64, JsValue> {
        self.fraction_of(parse_asset(asset)?, fraction).map_err(js_err)
    }

    /// Returns `true` if a new stake started.
    #[wasm_bindgen(js_name = trigger_stake)]
    pub fn js_trigger_stake(&mut self) -> bool {
        self.trigger_stake().is_some()
    }

    #[wasm_bindgen(js_name = cancel_stake)]
    pub fn js_cancel_stake(&mut self) -> bool {
        self.cancel_stake().is_some()
    }

    #[wasm_bindgen(js_name = acknowledge_notice)]
    pub fn js_acknowledge_notice(&mut self) -> Option<String> {
        self.acknowledge_notice()
    }

    #[wasm_bindgen(js_name = set_auto_trade)]
    pub fn js_set_auto_trade(&mut self, enabled: bool, proportion: f64) -> std::result::Result<(), JsValue> {
        self.set_auto_trade(enabled, proportion).map_err(js_err)
    }

    #[wasm_bindgen(js_name = shutdown)]
    pub fn js_shutdown(&mut self) {
        self.shutdown();
    }

    /// Reset to the starting state, keeping config and seed.
    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) {
        self.reset();
    }

    /// Reset to the starting state under a new seed.
    #[wasm_bindgen(js_name = reseed)]
    pub fn js_reseed(&mut self, seed: u64) {
        self.reseed(seed);
    }
}
