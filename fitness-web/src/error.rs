//! Error taxonomy for the detection pipeline
//!
//! Pose noise is expected, so every variant except `NotInitialized` is
//! reported as data (a rejected frame, a form message) rather than thrown.
//! The `Display` strings double as the instructions shown to the user.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::pose::PoseLandmark;

/// Everything that can go wrong between a landmark frame and a detection result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// Required joints absent, outside the frame, or NaN
    #[error("Move fully into view: {} not visible", describe_joints(.joints))]
    MissingLandmarks { joints: Vec<PoseLandmark> },

    /// Subject is not positioned the way the exercise needs
    #[error("{0}")]
    OrientationInvalid(String),

    /// One message per violated biomechanical rule
    #[error("{}", .0.join("; "))]
    FormInvalid(Vec<String>),

    /// Programming error: detection used before it was set up
    #[error("detector not initialized: {0}")]
    NotInitialized(&'static str),

    /// The pose-estimation collaborator failed for this tick
    #[error("pose estimation failed: {0}")]
    Inference(String),

    /// Landmark payload could not be interpreted
    #[error("malformed landmark frame: {0}")]
    MalformedFrame(String),

    /// Unknown exercise name or unparseable rules/config
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn describe_joints(joints: &[PoseLandmark]) -> String {
    joints
        .iter()
        .map(|joint| joint.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<DetectionError> for JsValue {
    fn from(err: DetectionError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl From<serde_json::Error> for DetectionError {
    fn from(err: serde_json::Error) -> Self {
        DetectionError::InvalidConfig(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for DetectionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        DetectionError::InvalidConfig(err.to_string())
    }
}
