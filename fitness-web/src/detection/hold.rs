//! Static hold state machine
//!
//! NOT_STABLE → STABLE when the frame is eligible to start a hold;
//! STABLE → NOT_STABLE when the frame reports a collapse (after
//! `grace_frames` consecutive collapsed frames, 0 by default).
//! Anything else leaves the timer as it is.

use serde::Serialize;

use crate::form::HoldSignal;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldState {
    /// Timer running
    pub is_stable: bool,
    /// Milliseconds, same clock as the frame timestamps
    pub start_time: Option<f64>,
    /// Seconds held so far
    pub duration: f64,
    /// Longest hold since the last reset, seconds
    pub best_duration: f64,
    /// Why the last running timer stopped
    pub break_reason: Option<String>,
    #[serde(skip)]
    collapsed_frames: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoldTransition {
    Started,
    Broken { reason: Option<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoldStep {
    pub state: HoldState,
    pub transition: Option<HoldTransition>,
}

impl HoldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's hold signal taken at `now_ms`
    pub fn advance(&self, signal: &HoldSignal, now_ms: f64, grace_frames: u32) -> HoldStep {
        let mut state = self.clone();
        let transition = match state.start_time {
            Some(start) if signal.collapsed => {
                state.collapsed_frames += 1;
                if state.collapsed_frames > grace_frames {
                    state.stop(signal.break_reason.clone());
                    Some(HoldTransition::Broken {
                        reason: signal.break_reason.clone(),
                    })
                } else {
                    state.tick(start, now_ms);
                    None
                }
            }
            Some(start) => {
                state.collapsed_frames = 0;
                state.tick(start, now_ms);
                None
            }
            None if signal.eligible => {
                state.is_stable = true;
                state.start_time = Some(now_ms);
                state.duration = 0.0;
                state.break_reason = None;
                state.collapsed_frames = 0;
                Some(HoldTransition::Started)
            }
            None => {
                state.duration = 0.0;
                None
            }
        };
        HoldStep { state, transition }
    }

    fn tick(&mut self, start: f64, now_ms: f64) {
        self.duration = ((now_ms - start) / 1000.0).max(0.0);
        self.best_duration = self.best_duration.max(self.duration);
    }

    fn stop(&mut self, reason: Option<String>) {
        self.is_stable = false;
        self.start_time = None;
        self.duration = 0.0;
        self.collapsed_frames = 0;
        self.break_reason = reason;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 30.0;

    fn steady() -> HoldSignal {
        HoldSignal {
            eligible: true,
            collapsed: false,
            break_reason: None,
        }
    }

    fn drifting() -> HoldSignal {
        HoldSignal {
            eligible: false,
            collapsed: false,
            break_reason: None,
        }
    }

    fn feed(state: HoldState, signals: &[HoldSignal], start_frame: usize, grace: u32) -> HoldState {
        signals
            .iter()
            .enumerate()
            .fold(state, |state, (i, signal)| {
                let now = (start_frame + i) as f64 * FRAME_MS;
                state.advance(signal, now, grace).state
            })
    }

    #[test]
    fn test_duration_tracks_frames_at_30fps() {
        let n = 90;
        let state = feed(HoldState::new(), &vec![steady(); n], 0, 0);
        assert!(state.is_stable);
        let expected = n as f64 / 30.0;
        assert!((state.duration - expected).abs() <= 1.0 / 30.0 + 1e-9);
    }

    #[test]
    fn test_single_collapse_resets() {
        let state = feed(HoldState::new(), &vec![steady(); 30], 0, 0);
        let broken = state.advance(&HoldSignal::collapsed("Knees dropped"), 30.0 * FRAME_MS, 0);
        assert_eq!(
            broken.transition,
            Some(HoldTransition::Broken {
                reason: Some("Knees dropped".to_string())
            })
        );
        assert_eq!(broken.state.duration, 0.0);
        assert!(broken.state.start_time.is_none());
        assert_eq!(broken.state.break_reason.as_deref(), Some("Knees dropped"));
        assert!(broken.state.best_duration > 0.9);

        let restarted = broken.state.advance(&steady(), 31.0 * FRAME_MS, 0);
        assert_eq!(restarted.transition, Some(HoldTransition::Started));
        assert_eq!(restarted.state.duration, 0.0);
        assert!(restarted.state.break_reason.is_none());
    }

    #[test]
    fn test_drift_neither_starts_nor_stops() {
        let idle = feed(HoldState::new(), &vec![drifting(); 10], 0, 0);
        assert!(!idle.is_stable);
        assert_eq!(idle.duration, 0.0);

        let running = feed(HoldState::new(), &vec![steady(); 10], 0, 0);
        let still_running = feed(running, &vec![drifting(); 20], 10, 0);
        assert!(still_running.is_stable);
        assert!(still_running.duration > 0.9);
    }

    #[test]
    fn test_grace_frames_absorb_short_collapses() {
        let collapse = HoldSignal::collapsed("wobble");
        let running = feed(HoldState::new(), &vec![steady(); 10], 0, 2);
        let survived = feed(running, &[collapse.clone(), collapse.clone(), steady()], 10, 2);
        assert!(survived.is_stable);

        let broken = feed(survived, &[collapse.clone(), collapse.clone(), collapse], 13, 2);
        assert!(!broken.is_stable);
        assert_eq!(broken.duration, 0.0);
    }
}
