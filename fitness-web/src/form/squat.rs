//! Squat form, side and front view
//!
//! The side view follows the knee angle and checks depth by comparing
//! hip and knee height. The front view cannot see the knee angle, so the
//! vertical hip-to-knee gap stands in for it and the orientation check
//! requires a symmetric stance instead of a profile.

use super::{check_range, in_motion, phase_limit, ExerciseForm, FormReport, FormRules, MetricKind, SideView};
use crate::error::DetectionError;
use crate::geometry::horizontal_offset;
use crate::pose::{symmetric_pairs, LandmarkFrame, Limb, Orientation, PoseLandmark, Side};

const KNEE_RANGE: (f32, f32) = (50.0, 180.0);

/// Hip crease may sit this far above the knee and still count as depth
const DEPTH_ALLOWANCE: f32 = 0.03;

const KNEE_OVER_ANKLE_REST: f32 = 0.05;
const KNEE_OVER_ANKLE_MOVING: f32 = 0.08;

const REQUIRED: [PoseLandmark; 8] = [
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

// ============================================================================
// SIDE VIEW
// ============================================================================

pub struct SideSquatForm;

impl SideSquatForm {
    /// Knee angle that counts as the bottom of a squat
    pub const KNEE_DOWN: f32 = 100.0;
    /// Knee angle that counts as standing
    pub const KNEE_UP: f32 = 160.0;
}

impl ExerciseForm for SideSquatForm {
    fn name(&self) -> &'static str {
        "squat"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::SideUpright
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        SideView::nearer(frame)
            .angle(Limb::Hip, Limb::Knee, Limb::Ankle)
            .ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let view = SideView::nearer(frame);
        let hip = view.at(Limb::Hip)?;
        let knee = view.at(Limb::Knee)?;
        let ankle = view.at(Limb::Ankle)?;

        let knee_angle = view.angle(Limb::Hip, Limb::Knee, Limb::Ankle)?;
        let moving = in_motion(knee_angle, Self::KNEE_DOWN, Self::KNEE_UP);
        check_range(report, rules, "knee_range", "knee_angle", knee_angle, KNEE_RANGE);

        let hip_angle = view.angle(Limb::Shoulder, Limb::Hip, Limb::Knee)?;
        report.metric("hip_angle", hip_angle, MetricKind::Angle);

        // y grows downward: hip at or below the knee means a positive drop
        let gap = knee.y - hip.y;
        report.metric("hip_knee_gap", gap, MetricKind::Deviation);
        if knee_angle <= Self::KNEE_DOWN {
            report.check(
                "depth",
                hip.y + DEPTH_ALLOWANCE >= knee.y,
                "Squat deeper: bring your hips down to knee height",
            );
        }

        let offset = horizontal_offset(knee, ankle);
        report.metric("knee_ankle_offset", offset, MetricKind::Deviation);
        report.check(
            "knee_over_ankle",
            offset <= phase_limit(moving, KNEE_OVER_ANKLE_REST, KNEE_OVER_ANKLE_MOVING),
            "Keep your knees over your ankles",
        );
        Ok(())
    }
}

// ============================================================================
// FRONT VIEW
// ============================================================================

pub struct FrontSquatForm;

impl FrontSquatForm {
    /// Hip-to-knee gap (knee.y - hip.y) that counts as the bottom
    pub const GAP_DOWN: f32 = 0.05;
    /// Hip-to-knee gap that counts as standing
    pub const GAP_UP: f32 = 0.15;

    /// Mean knee height minus mean hip height
    fn hip_knee_gap(frame: &LandmarkFrame) -> Result<f32, DetectionError> {
        let hips = nalgebra::center(
            &frame.require(PoseLandmark::LeftHip)?,
            &frame.require(PoseLandmark::RightHip)?,
        );
        let knees = nalgebra::center(
            &frame.require(PoseLandmark::LeftKnee)?,
            &frame.require(PoseLandmark::RightKnee)?,
        );
        Ok(knees.y - hips.y)
    }
}

impl ExerciseForm for FrontSquatForm {
    fn name(&self) -> &'static str {
        "front-squat"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::Front
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        Self::hip_knee_gap(frame).ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        _rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let pairs = symmetric_pairs(frame)?;
        report.metric("symmetry", pairs as f32 / 3.0, MetricKind::Score);

        let gap = Self::hip_knee_gap(frame)?;
        report.metric("hip_knee_gap", gap, MetricKind::Deviation);
        report.note("depth_reached", gap <= Self::GAP_DOWN);

        let moving = in_motion(gap, Self::GAP_DOWN, Self::GAP_UP);
        let limit = phase_limit(moving, KNEE_OVER_ANKLE_REST, KNEE_OVER_ANKLE_MOVING);
        let mut worst: f32 = 0.0;
        let mut aligned = true;
        for side in [Side::Left, Side::Right] {
            let view = SideView::new(frame, side);
            let offset = horizontal_offset(view.at(Limb::Knee)?, view.at(Limb::Ankle)?);
            worst = worst.max(offset);
            aligned &= offset <= limit;
        }
        report.metric("knee_ankle_offset", worst, MetricKind::Deviation);
        report.check(
            "knee_alignment",
            aligned,
            "Keep your knees in line with your ankles",
        );
        Ok(())
    }
}
