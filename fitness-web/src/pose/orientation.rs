//! Orientation validation - is the subject positioned the way the metrics assume?
//!
//! Side views need both sides of the body at the same height (the camera
//! sees a profile) and, for whole-body exercises, the shoulder→ankle line
//! running in the expected direction. The front view needs the body
//! roughly symmetric about the camera axis.

use nalgebra::Point2;

use super::landmarks::{LandmarkFrame, Limb, PoseLandmark, Side};
use crate::error::DetectionError;

/// Max |left.y - right.y| for a side view, as a fraction of frame height
pub const LEVEL_TOLERANCE: f32 = 0.05;

/// Min extent of the shoulder→ankle line along the body axis
pub const MIN_BODY_EXTENT: f32 = 0.30;

/// Max cross-axis / along-axis ratio of the shoulder→ankle line
pub const MAX_TILT_RATIO: f32 = 0.50;

/// Max |left.x - right.x| for a symmetric pair, as a fraction of frame width
pub const SYMMETRY_TOLERANCE: f32 = 0.25;

/// Symmetric pairs needed out of shoulders, hips, knees
pub const MIN_SYMMETRIC_PAIRS: usize = 2;

pub const TURN_SIDEWAYS: &str = "Position yourself sideways to the camera";
pub const GET_HORIZONTAL: &str = "Get into a horizontal position, side-on to the camera";
pub const STAND_UPRIGHT: &str = "Stand upright, side-on to the camera";
pub const STEP_BACK: &str = "Step back so your whole body is in view";
pub const FACE_CAMERA: &str = "Face the camera with your body centred";

/// Camera geometry an exercise's metrics assume
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Profile view, body horizontal (push-up, plank)
    SideHorizontal,
    /// Profile view, body vertical (side squat, lunge)
    SideUpright,
    /// Profile view, body direction changes during the movement (sit-up)
    Side,
    /// Facing the camera (front squat)
    Front,
    /// No positional requirement
    Any,
}

/// Check the frame against the required orientation.
///
/// Assumes the frame already passed frame validation for the joints used
/// here; a joint that is still missing is reported as such.
pub fn check_orientation(
    orientation: Orientation,
    frame: &LandmarkFrame,
) -> Result<(), DetectionError> {
    match orientation {
        Orientation::SideHorizontal => {
            check_profile(frame)?;
            let (dx, dy) = body_extent(frame)?;
            if dx < MIN_BODY_EXTENT || tilt(dx, dy) > MAX_TILT_RATIO {
                return invalid(GET_HORIZONTAL);
            }
            Ok(())
        }
        Orientation::SideUpright => {
            check_profile(frame)?;
            let (dx, dy) = body_extent(frame)?;
            if dy < MIN_BODY_EXTENT {
                return invalid(STEP_BACK);
            }
            if tilt(dy, dx) > MAX_TILT_RATIO {
                return invalid(STAND_UPRIGHT);
            }
            Ok(())
        }
        Orientation::Side => check_profile(frame),
        Orientation::Front => {
            if symmetric_pairs(frame)? >= MIN_SYMMETRIC_PAIRS {
                Ok(())
            } else {
                invalid(FACE_CAMERA)
            }
        }
        Orientation::Any => Ok(()),
    }
}

/// Count of shoulder, hip and knee pairs within `SYMMETRY_TOLERANCE` horizontally
pub fn symmetric_pairs(frame: &LandmarkFrame) -> Result<usize, DetectionError> {
    let mut count = 0;
    for limb in [Limb::Shoulder, Limb::Hip, Limb::Knee] {
        let (left, right) = pair(frame, limb)?;
        if (left.x - right.x).abs() <= SYMMETRY_TOLERANCE {
            count += 1;
        }
    }
    Ok(count)
}

/// Both shoulders and both hips at the same height
fn check_profile(frame: &LandmarkFrame) -> Result<(), DetectionError> {
    for limb in [Limb::Shoulder, Limb::Hip] {
        let (left, right) = pair(frame, limb)?;
        if (left.y - right.y).abs() > LEVEL_TOLERANCE {
            return invalid(TURN_SIDEWAYS);
        }
    }
    Ok(())
}

/// Horizontal and vertical extent of the shoulder-mid → ankle-mid line
fn body_extent(frame: &LandmarkFrame) -> Result<(f32, f32), DetectionError> {
    let shoulders = midpoint(frame, Limb::Shoulder)?;
    let ankles = midpoint(frame, Limb::Ankle)?;
    Ok((
        (ankles.x - shoulders.x).abs(),
        (ankles.y - shoulders.y).abs(),
    ))
}

/// Cross-axis extent relative to the extent along the expected axis
fn tilt(along: f32, across: f32) -> f32 {
    if along <= f32::EPSILON {
        f32::INFINITY
    } else {
        across / along
    }
}

fn pair(frame: &LandmarkFrame, limb: Limb) -> Result<(Point2<f32>, Point2<f32>), DetectionError> {
    let left = frame.require(PoseLandmark::of(Side::Left, limb))?;
    let right = frame.require(PoseLandmark::of(Side::Right, limb))?;
    Ok((left, right))
}

fn midpoint(frame: &LandmarkFrame, limb: Limb) -> Result<Point2<f32>, DetectionError> {
    let (left, right) = pair(frame, limb)?;
    Ok(nalgebra::center(&left, &right))
}

fn invalid(message: &str) -> Result<(), DetectionError> {
    Err(DetectionError::OrientationInvalid(message.to_string()))
}
