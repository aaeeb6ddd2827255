//! Plank and generic static holds
//!
//! Holds report two separate signals. A timer may only start from a
//! fully set-up pose, but once running only a collapse stops it: for the
//! plank that is bent knees. Drifting elbows or a frame that fails the
//! side-on orientation check neither start nor stop the timer.

use super::{ExerciseForm, FormReport, FormRules, HoldSignal, MetricKind, SideView};
use crate::error::DetectionError;
use crate::geometry::{horizontal_offset, vertical_offset};
use crate::pose::{LandmarkFrame, Limb, Orientation, PoseLandmark};

const MAX_SHOULDER_ELBOW_OFFSET: f32 = 0.20;
const MAX_BODY_LINE: f32 = 0.35;
const MIN_KNEE_ANGLE: f32 = 160.0;

/// Coarse stability: shoulder-mid to hip-mid vertical offset
const STABILITY_THRESHOLD: f32 = 0.10;

const KNEES_DROPPED: &str = "Knees dropped: keep your legs straight";
const HOLD_STEADY: &str = "Hold steady: keep your hips level with your shoulders";

const PLANK_REQUIRED: [PoseLandmark; 10] = [
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::RightElbow,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

const HOLD_REQUIRED: [PoseLandmark; 4] = [
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
];

/// Vertical distance between shoulder and hip midpoints
fn torso_offset(frame: &LandmarkFrame) -> Option<f32> {
    Some(vertical_offset(frame.mid(Limb::Shoulder)?, frame.mid(Limb::Hip)?))
}

// ============================================================================
// PLANK
// ============================================================================

pub struct PlankForm;

impl ExerciseForm for PlankForm {
    fn name(&self) -> &'static str {
        "plank"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &PLANK_REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::SideHorizontal
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        SideView::nearer(frame)
            .deviation(Limb::Hip, Limb::Shoulder, Limb::Ankle)
            .ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let view = SideView::nearer(frame);

        let offset = horizontal_offset(view.at(Limb::Shoulder)?, view.at(Limb::Elbow)?);
        report.metric("shoulder_elbow_offset", offset, MetricKind::Deviation);
        let set_up = report.check(
            "setup",
            offset <= MAX_SHOULDER_ELBOW_OFFSET,
            "Stack your shoulders over your elbows",
        );

        let body = view.deviation(Limb::Hip, Limb::Shoulder, Limb::Ankle)?;
        report.metric("body_line_deviation", body, MetricKind::Deviation);
        report.metric("back_straight", (1.0 - body).max(0.0), MetricKind::Score);
        let straight = report.check(
            "body_line",
            body <= MAX_BODY_LINE,
            "Keep your body in a straight line from shoulders to ankles",
        );

        let knee = view.angle(Limb::Hip, Limb::Knee, Limb::Ankle)?;
        let (min_knee, _) = rules.range_or("knee_angle", (MIN_KNEE_ANGLE, 180.0));
        report.ruled_metric("knee_angle", knee, MetricKind::Angle);
        let legs = report.check("knee_straight", knee >= min_knee, KNEES_DROPPED);

        if let Some(offset) = torso_offset(frame) {
            report.metric("stability", 1.0 - offset, MetricKind::Score);
        }

        report.hold = Some(if legs {
            HoldSignal {
                eligible: set_up && straight,
                collapsed: false,
                break_reason: None,
            }
        } else {
            HoldSignal::collapsed(KNEES_DROPPED)
        });
        Ok(())
    }

    fn orientation_lost(&self, report: &mut FormReport) {
        report.hold = Some(HoldSignal {
            eligible: false,
            collapsed: false,
            break_reason: None,
        });
    }
}

// ============================================================================
// GENERIC STATIC HOLD
// ============================================================================

/// Any hold judged only by torso stability
pub struct StaticHoldForm;

impl ExerciseForm for StaticHoldForm {
    fn name(&self) -> &'static str {
        "static-hold"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &HOLD_REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::Any
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        torso_offset(frame)
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let shoulders = nalgebra::center(
            &frame.require(PoseLandmark::LeftShoulder)?,
            &frame.require(PoseLandmark::RightShoulder)?,
        );
        let hips = nalgebra::center(
            &frame.require(PoseLandmark::LeftHip)?,
            &frame.require(PoseLandmark::RightHip)?,
        );
        let offset = vertical_offset(shoulders, hips);

        // A stability rule is a floor on 1 - offset
        let floor = rules
            .get("stability")
            .and_then(|bounds| bounds.min.or(bounds.threshold));
        let stable = match floor {
            Some(min) => 1.0 - offset >= min,
            None => offset < STABILITY_THRESHOLD,
        };

        report.metric("hold_offset", offset, MetricKind::Deviation);
        report.ruled_metric("stability", 1.0 - offset, MetricKind::Score);
        report.check("stable", stable, HOLD_STEADY);
        report.hold = Some(if stable {
            HoldSignal {
                eligible: true,
                collapsed: false,
                break_reason: None,
            }
        } else {
            HoldSignal::collapsed(HOLD_STEADY)
        });
        Ok(())
    }
}
