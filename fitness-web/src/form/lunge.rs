//! Lunge form
//!
//! Facing direction comes from the nose relative to the hips; the front
//! leg is the one whose ankle is further along that direction. At the
//! bottom both knees should be near right angles, and the front knee
//! should not travel past the toes.

use super::{ExerciseForm, FormReport, FormRules, MetricKind, SideView};
use crate::error::DetectionError;
use crate::geometry::three_point_angle;
use crate::pose::{LandmarkFrame, Limb, Orientation, PoseLandmark, Side};

/// 90° ± 10° for both knees at the bottom
const RIGHT_ANGLE: (f32, f32) = (80.0, 100.0);

/// How far the front knee may pass the toes, as a fraction of frame width
const MAX_KNEE_PAST_TOE: f32 = 0.10;

/// Reported when a rep leads with the same leg as the previous one
pub const SWITCH_LEGS: &str = "Switch legs: lead with your other leg";

const REQUIRED: [PoseLandmark; 11] = [
    PoseLandmark::Nose,
    PoseLandmark::LeftShoulder,
    PoseLandmark::RightShoulder,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
    PoseLandmark::LeftFootIndex,
    PoseLandmark::RightFootIndex,
];

pub struct LungeForm;

impl LungeForm {
    /// Front knee angle that counts as the bottom of a lunge
    pub const KNEE_DOWN: f32 = 100.0;
    /// Front knee angle that counts as standing
    pub const KNEE_UP: f32 = 160.0;

    /// +1.0 when facing +x, -1.0 when facing -x
    fn facing(frame: &LandmarkFrame) -> Result<f32, DetectionError> {
        let nose = frame.require(PoseLandmark::Nose)?;
        let hips = nalgebra::center(
            &frame.require(PoseLandmark::LeftHip)?,
            &frame.require(PoseLandmark::RightHip)?,
        );
        Ok(if nose.x >= hips.x { 1.0 } else { -1.0 })
    }

    /// Leg whose ankle is further forward
    pub fn front_leg(frame: &LandmarkFrame) -> Result<Side, DetectionError> {
        let direction = Self::facing(frame)?;
        let left = SideView::new(frame, Side::Left).at(Limb::Ankle)?;
        let right = SideView::new(frame, Side::Right).at(Limb::Ankle)?;
        Ok(if left.x * direction >= right.x * direction {
            Side::Left
        } else {
            Side::Right
        })
    }

    fn knee_angle(frame: &LandmarkFrame, side: Side) -> Result<f32, DetectionError> {
        let view = SideView::new(frame, side);
        Ok(three_point_angle(
            view.at(Limb::Hip)?,
            view.at(Limb::Knee)?,
            view.at(Limb::Ankle)?,
        ))
    }
}

impl ExerciseForm for LungeForm {
    fn name(&self) -> &'static str {
        "lunge"
    }

    fn required_joints(&self) -> &'static [PoseLandmark] {
        &REQUIRED
    }

    fn orientation(&self) -> Orientation {
        Orientation::SideUpright
    }

    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32> {
        let front = Self::front_leg(frame).ok()?;
        Self::knee_angle(frame, front).ok()
    }

    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError> {
        let direction = Self::facing(frame)?;
        let front = Self::front_leg(frame)?;
        report.front_leg = Some(front);

        let front_knee = Self::knee_angle(frame, front)?;
        let back_knee = Self::knee_angle(frame, front.other())?;
        report.ruled_metric("front_knee_angle", front_knee, MetricKind::Angle);
        report.ruled_metric("back_knee_angle", back_knee, MetricKind::Angle);

        if front_knee <= Self::KNEE_DOWN {
            let within = |metric: &str, angle: f32| {
                let (min, max) = rules.range_or(metric, RIGHT_ANGLE);
                (min..=max).contains(&angle)
            };
            report.check(
                "right_angles",
                within("front_knee_angle", front_knee) && within("back_knee_angle", back_knee),
                "Lower until both knees form right angles",
            );
        }

        let view = SideView::new(frame, front);
        let past_toe = (view.at(Limb::Knee)?.x - view.at(Limb::FootIndex)?.x) * direction;
        report.metric("knee_toe_offset", past_toe, MetricKind::Deviation);
        report.check(
            "front_shin",
            past_toe <= MAX_KNEE_PAST_TOE,
            "Keep your front knee behind your toes",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::validate;
    use crate::pose::Landmark;
    use crate::test_support::{lunge_frame, FrameBuilder};

    fn report(frame: &LandmarkFrame) -> FormReport {
        validate(&LungeForm, frame, &FormRules::new())
    }

    fn mirrored(frame: &LandmarkFrame) -> LandmarkFrame {
        LandmarkFrame::from_landmarks(
            frame
                .iter()
                .map(|(_, landmark)| landmark.map(|l| Landmark::new(1.0 - l.x, l.y, l.z))),
        )
        .unwrap()
    }

    #[test]
    fn test_bottom_position_valid() {
        let report = report(&lunge_frame(Side::Left, true));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.front_leg, Some(Side::Left));
        assert_eq!(report.passed("right_angles"), Some(true));
        assert!((report.primary.unwrap() - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_front_leg_follows_ankles() {
        assert_eq!(LungeForm::front_leg(&lunge_frame(Side::Right, true)).unwrap(), Side::Right);
        assert_eq!(LungeForm::front_leg(&lunge_frame(Side::Left, false)).unwrap(), Side::Left);
    }

    #[test]
    fn test_facing_the_other_way() {
        let frame = mirrored(&lunge_frame(Side::Right, true));
        assert_eq!(LungeForm::front_leg(&frame).unwrap(), Side::Right);
        assert!(report(&frame).is_valid());
    }

    #[test]
    fn test_standing_skips_right_angle_check() {
        let report = report(&lunge_frame(Side::Left, false));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.passed("right_angles"), None);
    }

    #[test]
    fn test_back_knee_not_bent_enough() {
        let frame = FrameBuilder::from(lunge_frame(Side::Left, true))
            .shift(PoseLandmark::RightKnee, -0.05, -0.07)
            .build();
        let report = report(&frame);
        assert_eq!(report.errors, vec!["Lower until both knees form right angles"]);
    }

    #[test]
    fn test_knee_past_toes() {
        let frame = FrameBuilder::from(lunge_frame(Side::Left, true))
            .shift(PoseLandmark::LeftKnee, 0.2, 0.0)
            .build();
        assert_eq!(report(&frame).passed("front_shin"), Some(false));
    }
}
