//! Pose module - landmark frames and the checks every analysis depends on
//!
//! Re-exports only. All logic in submodules.

mod landmarks;
mod orientation;
mod validation;

pub use landmarks::{Landmark, LandmarkFrame, Limb, PoseLandmark, Side, LANDMARK_COUNT};
pub use orientation::{
    check_orientation, symmetric_pairs, Orientation, FACE_CAMERA, GET_HORIZONTAL, STAND_UPRIGHT,
    STEP_BACK, TURN_SIDEWAYS,
};
pub use validation::{check_frame, FrameCheck};
