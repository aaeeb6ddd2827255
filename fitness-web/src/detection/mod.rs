//! Detection module - exercise profiles, state machines and event fan-out
//!
//! Re-exports only. All logic in submodules.

mod detector;
mod dispatcher;
mod hold;
mod lunge;
mod profile;
mod rep;

pub use detector::Detector;
pub use dispatcher::{DetectionEvent, DetectionObserver, DetectionResult, Dispatcher};
pub use hold::{HoldState, HoldStep, HoldTransition};
pub use lunge::LegAlternation;
pub use profile::{is_static_hold_name, ExerciseKind, ExerciseProfile, MotionMode, RepThresholds};
pub use rep::{RepState, RepStep, RepTransition};
