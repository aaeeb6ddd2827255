//! Landmark frames
//!
//! One frame is the full MediaPipe Pose result for a single instant:
//! 33 normalized points indexed by `PoseLandmark`. Frames are immutable
//! once built; every analysis stage borrows them.

use nalgebra::Point2;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Number of landmark slots in a MediaPipe Pose result
pub const LANDMARK_COUNT: usize = 33;

/// Flat layout without visibility: x, y, z per landmark
const XYZ_STRIDE: usize = 3;

/// Flat layout with visibility: x, y, z, visibility per landmark
const XYZV_STRIDE: usize = 4;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

/// Body-joint enumeration, discriminants match MediaPipe's landmark indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl PoseLandmark {
    /// Every landmark, in index order
    pub const ALL: [PoseLandmark; LANDMARK_COUNT] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftEyeInner,
        PoseLandmark::LeftEye,
        PoseLandmark::LeftEyeOuter,
        PoseLandmark::RightEyeInner,
        PoseLandmark::RightEye,
        PoseLandmark::RightEyeOuter,
        PoseLandmark::LeftEar,
        PoseLandmark::RightEar,
        PoseLandmark::MouthLeft,
        PoseLandmark::MouthRight,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftPinky,
        PoseLandmark::RightPinky,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftThumb,
        PoseLandmark::RightThumb,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
        PoseLandmark::LeftHeel,
        PoseLandmark::RightHeel,
        PoseLandmark::LeftFootIndex,
        PoseLandmark::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Machine name, e.g. `left_shoulder`
    pub fn name(self) -> &'static str {
        match self {
            PoseLandmark::Nose => "nose",
            PoseLandmark::LeftEyeInner => "left_eye_inner",
            PoseLandmark::LeftEye => "left_eye",
            PoseLandmark::LeftEyeOuter => "left_eye_outer",
            PoseLandmark::RightEyeInner => "right_eye_inner",
            PoseLandmark::RightEye => "right_eye",
            PoseLandmark::RightEyeOuter => "right_eye_outer",
            PoseLandmark::LeftEar => "left_ear",
            PoseLandmark::RightEar => "right_ear",
            PoseLandmark::MouthLeft => "mouth_left",
            PoseLandmark::MouthRight => "mouth_right",
            PoseLandmark::LeftShoulder => "left_shoulder",
            PoseLandmark::RightShoulder => "right_shoulder",
            PoseLandmark::LeftElbow => "left_elbow",
            PoseLandmark::RightElbow => "right_elbow",
            PoseLandmark::LeftWrist => "left_wrist",
            PoseLandmark::RightWrist => "right_wrist",
            PoseLandmark::LeftPinky => "left_pinky",
            PoseLandmark::RightPinky => "right_pinky",
            PoseLandmark::LeftIndex => "left_index",
            PoseLandmark::RightIndex => "right_index",
            PoseLandmark::LeftThumb => "left_thumb",
            PoseLandmark::RightThumb => "right_thumb",
            PoseLandmark::LeftHip => "left_hip",
            PoseLandmark::RightHip => "right_hip",
            PoseLandmark::LeftKnee => "left_knee",
            PoseLandmark::RightKnee => "right_knee",
            PoseLandmark::LeftAnkle => "left_ankle",
            PoseLandmark::RightAnkle => "right_ankle",
            PoseLandmark::LeftHeel => "left_heel",
            PoseLandmark::RightHeel => "right_heel",
            PoseLandmark::LeftFootIndex => "left_foot_index",
            PoseLandmark::RightFootIndex => "right_foot_index",
        }
    }

    /// Human-readable name for user-facing messages, e.g. `left shoulder`
    pub fn label(self) -> String {
        self.name().replace('_', " ")
    }

    /// The landmark for one limb joint on one side of the body
    pub fn of(side: Side, limb: Limb) -> Self {
        use PoseLandmark::*;
        match (side, limb) {
            (Side::Left, Limb::Shoulder) => LeftShoulder,
            (Side::Right, Limb::Shoulder) => RightShoulder,
            (Side::Left, Limb::Elbow) => LeftElbow,
            (Side::Right, Limb::Elbow) => RightElbow,
            (Side::Left, Limb::Wrist) => LeftWrist,
            (Side::Right, Limb::Wrist) => RightWrist,
            (Side::Left, Limb::Hip) => LeftHip,
            (Side::Right, Limb::Hip) => RightHip,
            (Side::Left, Limb::Knee) => LeftKnee,
            (Side::Right, Limb::Knee) => RightKnee,
            (Side::Left, Limb::Ankle) => LeftAnkle,
            (Side::Right, Limb::Ankle) => RightAnkle,
            (Side::Left, Limb::Heel) => LeftHeel,
            (Side::Right, Limb::Heel) => RightHeel,
            (Side::Left, Limb::FootIndex) => LeftFootIndex,
            (Side::Right, Limb::FootIndex) => RightFootIndex,
        }
    }
}

/// Body side as seen by the subject
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Paired limb joints that exist on both sides of the body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Limb {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
    Heel,
    FootIndex,
}

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single 3D landmark point (normalized coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // 0-1 normalized
    pub y: f32, // 0-1 normalized, grows downward
    #[serde(default)]
    pub z: f32, // Relative depth, smaller is nearer the camera
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// x and y are finite and inside the normalized frame
    pub fn is_in_frame(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    pub fn xy(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

/// All landmarks for one pose-estimation result
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Option<Landmark>; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Option<Landmark>; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from up to 33 landmarks in index order; trailing slots stay empty
    pub fn from_landmarks<I>(landmarks: I) -> Result<Self, DetectionError>
    where
        I: IntoIterator<Item = Option<Landmark>>,
    {
        let mut points = [None; LANDMARK_COUNT];
        for (i, landmark) in landmarks.into_iter().enumerate() {
            if i >= LANDMARK_COUNT {
                return Err(DetectionError::MalformedFrame(format!(
                    "more than {} landmarks",
                    LANDMARK_COUNT
                )));
            }
            points[i] = landmark;
        }
        Ok(Self { points })
    }

    /// Parse a flat `[x, y, z, ...]` array (99 values), or the
    /// `[x, y, z, visibility, ...]` layout (132 values) whose visibility
    /// channel is ignored. Shorter xyz arrays fill the leading slots.
    pub fn from_flat(data: &[f32]) -> Result<Self, DetectionError> {
        let stride = if data.len() == LANDMARK_COUNT * XYZV_STRIDE {
            XYZV_STRIDE
        } else if data.len() % XYZ_STRIDE == 0 && data.len() <= LANDMARK_COUNT * XYZ_STRIDE {
            XYZ_STRIDE
        } else {
            return Err(DetectionError::MalformedFrame(format!(
                "invalid landmark data length: {} (expected 99 or 132)",
                data.len()
            )));
        };

        Self::from_landmarks(
            data.chunks_exact(stride)
                .map(|chunk| Some(Landmark::new(chunk[0], chunk[1], chunk[2]))),
        )
    }

    /// Raw landmark record, whether or not it is usable
    pub fn get(&self, joint: PoseLandmark) -> Option<&Landmark> {
        self.points[joint.index()].as_ref()
    }

    /// 2D position of a joint that is present and inside the frame
    pub fn point(&self, joint: PoseLandmark) -> Option<Point2<f32>> {
        self.get(joint)
            .filter(|landmark| landmark.is_in_frame())
            .map(Landmark::xy)
    }

    /// Like `point`, but reports the joint as missing
    pub fn require(&self, joint: PoseLandmark) -> Result<Point2<f32>, DetectionError> {
        self.point(joint)
            .ok_or_else(|| DetectionError::MissingLandmarks { joints: vec![joint] })
    }

    /// Position of one side's limb joint
    pub fn limb(&self, side: Side, limb: Limb) -> Option<Point2<f32>> {
        self.point(PoseLandmark::of(side, limb))
    }

    /// Midpoint of the left and right joint of a limb
    pub fn mid(&self, limb: Limb) -> Option<Point2<f32>> {
        let left = self.limb(Side::Left, limb)?;
        let right = self.limb(Side::Right, limb)?;
        Some(nalgebra::center(&left, &right))
    }

    /// Side of the body closer to the camera (smaller mean shoulder/hip z).
    /// Side views take their angles from this chain; ties go left.
    pub fn nearer_side(&self) -> Side {
        let depth = |side: Side| {
            let shoulder = self.get(PoseLandmark::of(side, Limb::Shoulder)).map(|l| l.z);
            let hip = self.get(PoseLandmark::of(side, Limb::Hip)).map(|l| l.z);
            match (shoulder, hip) {
                (Some(s), Some(h)) if s.is_finite() && h.is_finite() => (s + h) / 2.0,
                _ => f32::INFINITY,
            }
        };
        if depth(Side::Right) < depth(Side::Left) {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseLandmark, Option<&Landmark>)> {
        PoseLandmark::ALL
            .iter()
            .map(move |&joint| (joint, self.get(joint)))
    }
}

impl Serialize for LandmarkFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.points.iter())
    }
}
