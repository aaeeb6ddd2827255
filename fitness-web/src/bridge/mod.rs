//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod detector;
mod settings;

pub use detector::ExerciseDetector;
pub use settings::{default_form_rules, init_logging, is_static_hold};
