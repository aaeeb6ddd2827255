//! Fitness Web - pose-landmark exercise analysis for the browser
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules

pub mod config;
pub mod detection;
pub mod error;
pub mod form;
pub mod geometry;
pub mod pose;

mod bridge;

#[cfg(test)]
mod test_support;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::{default_form_rules, init_logging, is_static_hold, ExerciseDetector};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
