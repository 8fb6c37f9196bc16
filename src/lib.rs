//! Wrong Calc core crate.
//!
//! A calculator widget that answers with plausible but wrong results unless it
//! is switched into correct mode. The arithmetic core ([`calculator`]) is plain
//! Rust with no browser dependency; [`dom`] binds it to a page through
//! wasm-bindgen.

use wasm_bindgen::prelude::*;

pub mod calculator;
pub mod config;
pub mod dom;

pub use calculator::{
    Action, CalcError, Calculator, FeedbackEvent, FeedbackKind, ModeChangedEvent, Operator,
    Outcome, RandomSource, RenderSnapshot, SequenceRandom, SmallRng,
};
pub use config::CalculatorConfig;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Mount the calculator on the current page with default settings.
#[wasm_bindgen]
pub fn start_calculator() -> Result<(), JsValue> {
    dom::mount(CalculatorConfig::default())
}

/// Mount the calculator using a JSON config, e.g. `{"startInWrongMode": false}`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_calculator_with_config(json: &str) -> Result<(), JsValue> {
    let config = CalculatorConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    dom::mount(config)
}
