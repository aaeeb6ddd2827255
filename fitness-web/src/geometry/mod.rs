//! Geometry module - pure metric calculators over normalized points
//!
//! Re-exports only. All logic in submodules.

mod alignment;
mod angles;

pub use alignment::{horizontal_offset, line_deviation, vertical_offset};
pub use angles::three_point_angle;
