//! Detector tunables that are not form rules

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Consecutive collapsed frames a running hold timer survives
    pub hold_grace_frames: u32,
    /// Reject a lunge rep that leads with the same leg as the last counted one
    pub require_alternating_legs: bool,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DetectionError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            hold_grace_frames: 0,
            require_alternating_legs: true,
        }
    }
}
