//! Form validation - per-exercise biomechanical checks
//!
//! Every exercise runs the same pipeline: frame validation, orientation,
//! the exercise's own checks, then any externally supplied form rules.

mod lunge;
mod plank;
mod pushup;
mod report;
mod rules;
mod situp;
mod squat;

pub use lunge::{LungeForm, SWITCH_LEGS};
pub use plank::{PlankForm, StaticHoldForm};
pub use pushup::PushUpForm;
pub use report::{Check, FormReport, HoldSignal, Metric, MetricKind};
pub use rules::{advice, Bound, FormRules, RuleBounds, KNOWN_METRICS};
pub use situp::SitUpForm;
pub use squat::{FrontSquatForm, SideSquatForm};

use nalgebra::Point2;

use crate::error::DetectionError;
use crate::geometry::{line_deviation, three_point_angle};
use crate::pose::{
    check_frame, check_orientation, LandmarkFrame, Limb, Orientation, PoseLandmark, Side, STEP_BACK,
};

/// One exercise's view of a frame
pub trait ExerciseForm: Sync {
    fn name(&self) -> &'static str;

    /// Joints that must pass frame validation before anything is judged
    fn required_joints(&self) -> &'static [PoseLandmark];

    fn orientation(&self) -> Orientation;

    /// The continuous value the rep or hold machine follows
    fn primary_metric(&self, frame: &LandmarkFrame) -> Option<f32>;

    /// Exercise-specific checks and metrics. Only called on frames that
    /// passed frame and orientation validation.
    fn evaluate(
        &self,
        frame: &LandmarkFrame,
        rules: &FormRules,
        report: &mut FormReport,
    ) -> Result<(), DetectionError>;

    /// Hook for a frame that failed orientation
    fn orientation_lost(&self, _report: &mut FormReport) {}
}

/// Judge one frame for one exercise
pub fn validate(form: &dyn ExerciseForm, frame: &LandmarkFrame, rules: &FormRules) -> FormReport {
    let check = check_frame(frame, form.required_joints());
    if !check.is_valid() {
        return FormReport::rejected(DetectionError::MissingLandmarks {
            joints: check.missing_joints,
        });
    }

    let mut report = FormReport::new();
    report.primary = form.primary_metric(frame);

    if let Err(err) = check_orientation(form.orientation(), frame) {
        report.fail(err.to_string());
        form.orientation_lost(&mut report);
        return report;
    }

    if let Err(err) = form.evaluate(frame, rules, &mut report) {
        report.fail(err.to_string());
    }
    rules.evaluate(&mut report);

    let valid = report.is_valid();
    if let Some(hold) = report.hold.as_mut() {
        hold.eligible &= valid;
    }
    report
}

/// Strictly between the bottom and top reference values
pub fn in_motion(metric: f32, bottom: f32, top: f32) -> bool {
    metric > bottom && metric < top
}

/// Tolerance for the current phase of the movement
pub(crate) fn phase_limit(moving: bool, at_rest: f32, in_motion: f32) -> f32 {
    if moving {
        in_motion
    } else {
        at_rest
    }
}

/// Record a ranged angle as a rule-governed metric and check it.
/// A rule for the same metric replaces the built-in range.
pub(crate) fn check_range(
    report: &mut FormReport,
    rules: &FormRules,
    check: &'static str,
    metric: &'static str,
    value: f32,
    range: (f32, f32),
) -> bool {
    let (min, max) = rules.range_or(metric, range);
    report.ruled_metric(metric, value, MetricKind::Angle);
    let bound = if value < min {
        Some(Bound::Low)
    } else if value > max {
        Some(Bound::High)
    } else {
        None
    };
    match bound {
        Some(bound) => report.check(check, false, &advice(metric, bound)),
        None => report.check(check, true, ""),
    }
}

/// One side's limb chain
pub(crate) struct SideView<'a> {
    frame: &'a LandmarkFrame,
    pub side: Side,
}

impl<'a> SideView<'a> {
    pub fn new(frame: &'a LandmarkFrame, side: Side) -> Self {
        Self { frame, side }
    }

    /// Chain closer to the camera
    pub fn nearer(frame: &'a LandmarkFrame) -> Self {
        Self::new(frame, frame.nearer_side())
    }

    pub fn at(&self, limb: Limb) -> Result<Point2<f32>, DetectionError> {
        self.frame.require(PoseLandmark::of(self.side, limb))
    }

    pub fn angle(&self, proximal: Limb, vertex: Limb, distal: Limb) -> Result<f32, DetectionError> {
        Ok(three_point_angle(
            self.at(proximal)?,
            self.at(vertex)?,
            self.at(distal)?,
        ))
    }

    /// Deviation of `point` off `start`→`end`; a collapsed segment means
    /// the body is not extended enough to judge
    pub fn deviation(&self, point: Limb, start: Limb, end: Limb) -> Result<f32, DetectionError> {
        line_deviation(self.at(point)?, self.at(start)?, self.at(end)?)
            .ok_or_else(|| DetectionError::OrientationInvalid(STEP_BACK.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, TURN_SIDEWAYS};
    use crate::test_support::{pushup_frame, FrameBuilder};

    #[test]
    fn test_missing_joint_short_circuits() {
        let frame = FrameBuilder::from(pushup_frame(170.0, 0.0))
            .set(PoseLandmark::LeftWrist, Landmark::new(f32::NAN, 0.5, 0.0))
            .build();
        let report = validate(&PushUpForm, &frame, &FormRules::new());
        assert_eq!(report.missing, vec![PoseLandmark::LeftWrist]);
        assert!(report.primary.is_none());
        assert!(report.metrics.is_empty());
    }

    #[test]
    fn test_orientation_failure_skips_checks() {
        let frame = FrameBuilder::from(pushup_frame(170.0, 0.0))
            .shift(PoseLandmark::RightHip, 0.0, 0.1)
            .build();
        let report = validate(&PushUpForm, &frame, &FormRules::new());
        assert!(report.frame_valid());
        assert_eq!(report.errors, vec![TURN_SIDEWAYS]);
        assert!(report.checks.is_empty());
    }

    #[test]
    fn test_empty_rules_leave_built_in_checks() {
        let report = validate(&PushUpForm, &pushup_frame(170.0, 0.0), &FormRules::new());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(!report.checks.is_empty());
    }

    #[test]
    fn test_rule_replaces_built_in_range() {
        let rules = FormRules::new().with("elbow_angle", RuleBounds::at_least(100.0));
        let mut report = FormReport::new();
        assert!(!check_range(&mut report, &rules, "elbow_range", "elbow_angle", 95.0, (90.0, 180.0)));
        rules.evaluate(&mut report);
        assert_eq!(report.errors, vec![advice("elbow_angle", Bound::Low)]);
    }

    #[test]
    fn test_in_motion_band_is_open() {
        assert!(in_motion(130.0, 100.0, 160.0));
        assert!(!in_motion(100.0, 100.0, 160.0));
        assert!(!in_motion(160.0, 100.0, 160.0));
    }
}
