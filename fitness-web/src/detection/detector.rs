//! Per-frame pipeline
//!
//! Owns the single mutable copy of the rep, hold and leg-alternation
//! state. A frame that fails frame validation changes none of it but
//! still produces a result carrying the errors.

use super::dispatcher::{DetectionEvent, DetectionResult};
use super::hold::{HoldState, HoldTransition};
use super::lunge::LegAlternation;
use super::profile::{ExerciseKind, MotionMode, RepThresholds};
use super::rep::{RepState, RepTransition};
use crate::config::DetectorConfig;
use crate::form::{validate, FormReport, FormRules, HoldSignal, SWITCH_LEGS};
use crate::pose::LandmarkFrame;

pub struct Detector {
    kind: ExerciseKind,
    rules: FormRules,
    config: DetectorConfig,
    rep: RepState,
    hold: HoldState,
    legs: LegAlternation,
}

impl Detector {
    pub fn new(kind: ExerciseKind) -> Self {
        Self::with_settings(kind, FormRules::new(), DetectorConfig::default())
    }

    pub fn with_settings(kind: ExerciseKind, rules: FormRules, config: DetectorConfig) -> Self {
        Self {
            kind,
            rules,
            config,
            rep: RepState::new(),
            hold: HoldState::new(),
            legs: LegAlternation::new(),
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    /// Switch profile; a different exercise starts from a clean slate.
    /// Returns whether the state was reset.
    pub fn set_exercise(&mut self, kind: ExerciseKind) -> bool {
        if kind == self.kind {
            return false;
        }
        log::info!("exercise: {} -> {}", self.kind.name(), kind.name());
        self.kind = kind;
        self.reset();
        true
    }

    pub fn rules(&self) -> &FormRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: FormRules) {
        let unknown = rules.unknown_metrics();
        if !unknown.is_empty() {
            log::debug!("form rules for unknown metrics ignored: {}", unknown.join(", "));
        }
        self.rules = rules;
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DetectorConfig) {
        self.config = config;
    }

    pub fn rep_state(&self) -> RepState {
        self.rep
    }

    pub fn hold_state(&self) -> &HoldState {
        &self.hold
    }

    pub fn reset_rep_count(&mut self) {
        self.rep = RepState::new();
        self.legs.reset();
    }

    pub fn reset_hold_timer(&mut self) {
        self.hold = HoldState::new();
    }

    pub fn reset(&mut self) {
        self.reset_rep_count();
        self.reset_hold_timer();
    }

    /// Run one frame taken at `now_ms` through validation and the state machines
    pub fn process(&mut self, frame: &LandmarkFrame, now_ms: f64) -> Vec<DetectionEvent> {
        let profile = self.kind.profile();
        let mut report = validate(profile.form, frame, &self.rules);
        let mut counted = None;

        if !report.frame_valid() {
            if let Some(err) = report.error() {
                log::debug!("{}: frame skipped: {}", self.kind.name(), err);
            }
        } else {
            match profile.mode {
                MotionMode::Reps(band) => {
                    if let Some(metric) = report.primary {
                        counted = self.advance_reps(metric, band, &mut report);
                    }
                }
                MotionMode::Hold => {
                    if let Some(signal) = report.hold.as_ref() {
                        self.advance_hold(signal, now_ms);
                    }
                }
            }
        }

        let mut events = Vec::with_capacity(3);
        if let Some(count) = counted {
            events.push(DetectionEvent::RepDetected(count));
        }
        if !report.errors.is_empty() {
            events.push(DetectionEvent::FormError(report.errors.clone()));
        }
        events.push(DetectionEvent::Update(Box::new(self.snapshot(frame, report))));
        events
    }

    fn advance_reps(
        &mut self,
        metric: f32,
        band: RepThresholds,
        report: &mut FormReport,
    ) -> Option<u32> {
        if self.kind == ExerciseKind::Lunge
            && self.config.require_alternating_legs
            && self.rep.is_down
            && metric >= band.top
            && self.legs.repeats_last()
        {
            report.fail(SWITCH_LEGS);
        }

        let step = self.rep.advance(metric, report.is_valid(), band);
        self.rep = step.state;

        match step.transition {
            Some(RepTransition::WentDown) => {
                self.legs.descend(report.front_leg);
                None
            }
            Some(RepTransition::CameUp { counted: true }) => {
                self.legs.commit();
                log::info!("{}: rep {}", self.kind.name(), self.rep.rep_count);
                Some(self.rep.rep_count)
            }
            Some(RepTransition::CameUp { counted: false }) => {
                self.legs.abandon();
                if let Some(err) = report.error() {
                    log::debug!("{}: rep not counted: {}", self.kind.name(), err);
                }
                None
            }
            None => None,
        }
    }

    fn advance_hold(&mut self, signal: &HoldSignal, now_ms: f64) {
        let step = self.hold.advance(signal, now_ms, self.config.hold_grace_frames);
        match &step.transition {
            Some(HoldTransition::Started) => log::info!("{}: hold started", self.kind.name()),
            Some(HoldTransition::Broken { reason }) => log::info!(
                "{}: hold broken after {:.1}s: {}",
                self.kind.name(),
                self.hold.duration,
                reason.as_deref().unwrap_or("unstable")
            ),
            None => {}
        }
        self.hold = step.state;
    }

    fn snapshot(&self, frame: &LandmarkFrame, report: FormReport) -> DetectionResult {
        DetectionResult {
            exercise: self.kind.name(),
            landmarks: frame.clone(),
            rep_state: self.rep,
            hold_state: self.hold.clone(),
            form_valid: report.is_valid(),
            form_errors: report.errors,
            missing_joints: report.missing,
            metric: report.primary,
            metrics: report.metrics,
            checks: report.checks,
            front_leg: report.front_leg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, PoseLandmark, Side};
    use crate::test_support::{
        front_squat_frame, lunge_frame, plank_frame, pushup_frame, situp_frame, squat_frame,
        FrameBuilder,
    };

    const FRAME_MS: f64 = 1000.0 / 30.0;

    /// Feed frames at 30 fps, return every event
    fn run(detector: &mut Detector, frames: &[LandmarkFrame]) -> Vec<DetectionEvent> {
        let mut events = Vec::new();
        for (i, frame) in frames.iter().enumerate() {
            events.extend(detector.process(frame, i as f64 * FRAME_MS));
        }
        events
    }

    fn reps(events: &[DetectionEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|event| match event {
                DetectionEvent::RepDetected(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    fn last_update(events: &[DetectionEvent]) -> &DetectionResult {
        events
            .iter()
            .rev()
            .find_map(|event| match event {
                DetectionEvent::Update(result) => Some(result.as_ref()),
                _ => None,
            })
            .unwrap()
    }

    fn pushups(elbows: &[f32]) -> Vec<LandmarkFrame> {
        elbows.iter().map(|&elbow| pushup_frame(elbow, 0.0)).collect()
    }

    #[test]
    fn test_pushup_cycle_counts_exactly_once() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        let events = run(&mut detector, &pushups(&[180.0, 140.0, 92.0, 130.0, 180.0]));
        assert_eq!(reps(&events), vec![1]);
        assert_eq!(detector.rep_state().rep_count, 1);
    }

    #[test]
    fn test_shallow_pushup_not_counted() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        let events = run(&mut detector, &pushups(&[180.0, 120.0, 180.0]));
        assert!(reps(&events).is_empty());
        assert_eq!(detector.rep_state().rep_count, 0);
    }

    #[test]
    fn test_bent_body_at_top_drops_rep() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        let mut frames = pushups(&[180.0, 92.0]);
        frames.push(pushup_frame(175.0, 0.2));
        let events = run(&mut detector, &frames);
        assert!(reps(&events).is_empty());
        assert!(!detector.rep_state().is_down);
        assert!(!last_update(&events).form_valid);
    }

    #[test]
    fn test_event_order() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        run(&mut detector, &pushups(&[180.0, 92.0]));
        let events = detector.process(&pushup_frame(175.0, 0.0), 100.0);
        assert!(matches!(
            events.as_slice(),
            [DetectionEvent::RepDetected(1), DetectionEvent::Update(_)]
        ));

        let events = detector.process(&pushup_frame(175.0, 0.2), 200.0);
        assert!(matches!(
            events.as_slice(),
            [DetectionEvent::FormError(_), DetectionEvent::Update(_)]
        ));
    }

    #[test]
    fn test_invalid_frame_holds_state() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        run(&mut detector, &pushups(&[180.0, 92.0]));
        let before = detector.rep_state();

        let occluded = FrameBuilder::from(pushup_frame(180.0, 0.0))
            .set(PoseLandmark::LeftWrist, Landmark::new(f32::NAN, 0.5, 0.0))
            .build();
        let events = detector.process(&occluded, 100.0);
        assert_eq!(detector.rep_state(), before);

        let result = last_update(&events);
        assert!(!result.form_valid);
        assert_eq!(result.missing_joints, vec![PoseLandmark::LeftWrist]);
        assert!(matches!(events[0], DetectionEvent::FormError(_)));
    }

    #[test]
    fn test_squat_variants_count() {
        let mut side = Detector::new(ExerciseKind::Squat);
        let frames: Vec<_> = [175.0, 130.0, 90.0, 130.0, 175.0]
            .iter()
            .map(|&knee| squat_frame(knee))
            .collect();
        assert_eq!(reps(&run(&mut side, &frames)), vec![1]);

        let mut front = Detector::new(ExerciseKind::FrontSquat);
        let frames: Vec<_> = [0.20, 0.10, 0.03, 0.10, 0.20]
            .iter()
            .map(|&gap| front_squat_frame(gap, 0.20, 0.0))
            .collect();
        assert_eq!(reps(&run(&mut front, &frames)), vec![1]);
    }

    #[test]
    fn test_situp_cycle_counts() {
        let mut detector = Detector::new(ExerciseKind::SitUp);
        let frames = [situp_frame(false), situp_frame(true), situp_frame(false)];
        assert_eq!(reps(&run(&mut detector, &frames)), vec![1]);
    }

    fn lunge(front: Side) -> Vec<LandmarkFrame> {
        vec![lunge_frame(front, false), lunge_frame(front, true), lunge_frame(front, false)]
    }

    #[test]
    fn test_lunge_must_alternate_legs() {
        let mut detector = Detector::new(ExerciseKind::Lunge);
        assert_eq!(reps(&run(&mut detector, &lunge(Side::Left))), vec![1]);

        let events = run(&mut detector, &lunge(Side::Left));
        assert!(reps(&events).is_empty());
        assert!(events
            .iter()
            .any(|event| matches!(event, DetectionEvent::FormError(errors) if errors.contains(&SWITCH_LEGS.to_string()))));

        assert_eq!(reps(&run(&mut detector, &lunge(Side::Right))), vec![2]);
    }

    #[test]
    fn test_lunge_alternation_can_be_disabled() {
        let config = DetectorConfig {
            require_alternating_legs: false,
            ..DetectorConfig::default()
        };
        let mut detector = Detector::with_settings(ExerciseKind::Lunge, FormRules::new(), config);
        run(&mut detector, &lunge(Side::Left));
        run(&mut detector, &lunge(Side::Left));
        assert_eq!(detector.rep_state().rep_count, 2);
    }

    #[test]
    fn test_plank_hold_and_break() {
        let mut detector = Detector::new(ExerciseKind::Plank);
        let frames = vec![plank_frame(0.0); 61];
        let mut last = 0.0;
        for (i, frame) in frames.iter().enumerate() {
            last = i as f64 * FRAME_MS;
            detector.process(frame, last);
        }
        assert!(detector.hold_state().is_stable);
        assert!((detector.hold_state().duration - 2.0).abs() < 0.01);

        detector.process(&plank_frame(0.16), last + FRAME_MS);
        let hold = detector.hold_state();
        assert!(!hold.is_stable);
        assert_eq!(hold.duration, 0.0);
        assert_eq!(
            hold.break_reason.as_deref(),
            Some("Knees dropped: keep your legs straight")
        );
        assert!(hold.best_duration >= 2.0 - 0.01);
        assert_eq!(detector.rep_state().rep_count, 0);
    }

    #[test]
    fn test_plank_timer_survives_orientation_jitter() {
        let mut detector = Detector::new(ExerciseKind::Plank);
        let mut now = 0.0;
        for _ in 0..61 {
            detector.process(&plank_frame(0.0), now);
            now += FRAME_MS;
        }
        assert!((detector.hold_state().duration - 2.0).abs() < 0.01);

        let jitter = FrameBuilder::from(plank_frame(0.0))
            .shift(PoseLandmark::RightShoulder, 0.0, 0.06)
            .build();
        let events = detector.process(&jitter, now);
        let result = last_update(&events);
        assert_eq!(
            result.form_errors,
            vec!["Position yourself sideways to the camera"]
        );
        assert!(result.hold_state.is_stable);
        assert_eq!(result.hold_state.break_reason, None);

        now += FRAME_MS;
        detector.process(&plank_frame(0.0), now);
        let hold = detector.hold_state();
        assert!(hold.is_stable);
        assert!(hold.duration > 2.0);
        assert_eq!(hold.start_time, Some(0.0));
    }

    #[test]
    fn test_switching_exercise_resets_state() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        run(&mut detector, &pushups(&[180.0, 92.0, 180.0]));
        assert!(!detector.set_exercise(ExerciseKind::PushUp));
        assert_eq!(detector.rep_state().rep_count, 1);

        detector.set_rules(FormRules::defaults_for("push-up"));
        assert_eq!(detector.rep_state().rep_count, 1);

        assert!(detector.set_exercise(ExerciseKind::Squat));
        assert_eq!(detector.rep_state(), RepState::new());
    }

    #[test]
    fn test_explicit_resets() {
        let mut detector = Detector::new(ExerciseKind::PushUp);
        run(&mut detector, &pushups(&[180.0, 92.0, 180.0]));
        detector.reset_rep_count();
        assert_eq!(detector.rep_state().rep_count, 0);
        detector.reset_rep_count();
        detector.reset_hold_timer();
        assert_eq!(*detector.hold_state(), HoldState::new());
    }
}
