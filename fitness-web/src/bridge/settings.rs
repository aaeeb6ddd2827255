//! Free-standing entry points: logging setup and rule/exercise lookups

use wasm_bindgen::prelude::*;

use super::detector::to_js;
use crate::detection::is_static_hold_name;
use crate::form::FormRules;

/// Route `log` output to the browser console. Levels: trace, debug, info,
/// warn, error; anything else means info.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let level = match level.to_ascii_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("fitness-web logging at {}", level);
}

/// Built-in form rules for an exercise name
#[wasm_bindgen(js_name = defaultFormRules)]
pub fn default_form_rules(exercise: &str) -> Result<JsValue, JsValue> {
    to_js(&FormRules::defaults_for(exercise))
}

/// True when the name describes a timed hold rather than reps
#[wasm_bindgen(js_name = isStaticHold)]
pub fn is_static_hold(exercise: &str) -> bool {
    is_static_hold_name(exercise)
}
