//! Push-up form
//!
//! Side view, body horizontal. The elbow angle of the chain nearer the
//! camera drives the rep machine; the body and leg lines are judged more
//! leniently while the subject is between the top and bottom positions.

use super::{check_range, in_motion, phase_limit, ExerciseForm, FormReport, FormRules, MetricKind, SideView};
use crate::error::DetectionError;
use crate::pose::{LandmarkFrame, Limb, Orientation, PoseLandmark};

const ELBOW_RANGE: (f32, f32) = (90.0, 180.0);

// Relative deviation of the hip off shoulder→ankle
const BODY_LINE_REST: f32 = 0.30;
const BODY_LINE_MOVING: f32 = 0.40;

// Relative deviation of the knee off hip→ankle
const LEG_LINE_REST: f32 = 0.08;
const LEG_LINE_MOVING: f32 = 0.12;

const REQUIRED: [PoseLandmark; 12] = [
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::RightElbow,
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

pub struct PushUpForm;

impl PushUpForm {
    /// Elbow angle that counts as the bottom of a push-up
    pub const ELBOW_DOWN: f32 = 100.0;
    /// Elbow angle that counts as the top of a push-up
    pub const ELBOW_UP: f32 = 160.0;
}

impl ExerciseForm for PushUpForm {
    fn name(&self) -> &'static str {
        "push-up"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::SideHorizontal
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        SideView::nearer(frame)
            .angle(Limb::Shoulder, Limb::Elbow, Limb::Wrist)
            .ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let view = SideView::nearer(frame);
        let elbow = view.angle(Limb::Shoulder, Limb::Elbow, Limb::Wrist)?;
        let moving = in_motion(elbow, Self::ELBOW_DOWN, Self::ELBOW_UP);

        check_range(report, rules, "elbow_range", "elbow_angle", elbow, ELBOW_RANGE);

        let body = view.deviation(Limb::Hip, Limb::Shoulder, Limb::Ankle)?;
        report.metric("body_line_deviation", body, MetricKind::Deviation);
        report.metric("back_straight", (1.0 - body).max(0.0), MetricKind::Score);
        report.check(
            "body_line",
            body <= phase_limit(moving, BODY_LINE_REST, BODY_LINE_MOVING),
            "Keep your body in a straight line from shoulders to ankles",
        );

        let legs = view.deviation(Limb::Knee, Limb::Hip, Limb::Ankle)?;
        report.metric("leg_line_deviation", legs, MetricKind::Deviation);
        report.check(
            "leg_line",
            legs <= phase_limit(moving, LEG_LINE_REST, LEG_LINE_MOVING),
            "Keep your legs straight",
        );
        Ok(())
    }
}
