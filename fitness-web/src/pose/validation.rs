//! Frame validation
//!
//! Precondition for every downstream computation: the joints an exercise
//! needs must be present, finite and inside the normalized frame.

use serde::Serialize;

use super::landmarks::{LandmarkFrame, PoseLandmark};

/// Outcome of checking a frame against a required-joint set
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCheck {
    pub missing_joints: Vec<PoseLandmark>,
}

impl FrameCheck {
    pub fn is_valid(&self) -> bool {
        self.missing_joints.is_empty()
    }
}

/// List every required joint that is absent, NaN, or outside `[0,1]`
pub fn check_frame(frame: &LandmarkFrame, required: &[PoseLandmark]) -> FrameCheck {
    let missing_joints = required
        .iter()
        .copied()
        .filter(|&joint| frame.point(joint).is_none())
        .collect();
    FrameCheck { missing_joints }
}
