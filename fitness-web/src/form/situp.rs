//! Sit-up form
//!
//! Side view; the body swings from horizontal to upright, so only the
//! profile (level shoulders and hips) is required. The hip angle drives
//! the rep machine: lying back opens it, curling up closes it.

use super::{ExerciseForm, FormReport, FormRules, MetricKind, SideView};
use crate::error::DetectionError;
use crate::pose::{LandmarkFrame, Limb, Orientation, PoseLandmark};

const KNEE_RANGE: (f32, f32) = (45.0, 120.0);

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

pub struct SitUpForm;

impl SitUpForm {
    /// Hip angle of a completed curl
    pub const HIP_FLEXED: f32 = 70.0;
    /// Hip angle of lying back down
    pub const HIP_EXTENDED: f32 = 110.0;
}

impl ExerciseForm for SitUpForm {
    fn name(&self) -> &'static str {
        "sit-up"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::Side
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        SideView::nearer(frame)
            .angle(Limb::Shoulder, Limb::Hip, Limb::Knee)
            .ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let view = SideView::nearer(frame);
        let hip = view.angle(Limb::Shoulder, Limb::Hip, Limb::Knee)?;
        report.metric("hip_angle", hip, MetricKind::Angle);

        let knee = view.angle(Limb::Hip, Limb::Knee, Limb::Ankle)?;
        let (min, max) = rules.range_or("knee_angle", KNEE_RANGE);
        report.ruled_metric("knee_angle", knee, MetricKind::Angle);
        report.check(
            "knees_bent",
            (min..=max).contains(&knee),
            "Keep your knees bent with your feet flat",
        );
        Ok(())
    }
}
