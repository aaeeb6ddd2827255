//! Result fan-out
//!
//! Each processed frame yields at most one event of each kind. Observers
//! subscribe to the dispatcher and only override the events they want.

use serde::Serialize;

use super::hold::HoldState;
use super::rep::RepState;
use crate::form::{Check, Metric};
use crate::pose::{LandmarkFrame, PoseLandmark, Side};

/// Snapshot of one processed frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub exercise: &'static str,
    pub landmarks: LandmarkFrame,
    pub rep_state: RepState,
    pub hold_state: HoldState,
    pub form_valid: bool,
    pub form_errors: Vec<String>,
    pub missing_joints: Vec<PoseLandmark>,
    /// Primary metric of the frame, if it could be measured
    pub metric: Option<f32>,
    pub metrics: Vec<Metric>,
    pub checks: Vec<Check>,
    pub front_leg: Option<Side>,
}

/// Emitted in this order: rep, form errors, update
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionEvent {
    RepDetected(u32),
    FormError(Vec<String>),
    Update(Box<DetectionResult>),
}

pub trait DetectionObserver {
    fn on_rep_detected(&self, _rep_count: u32) {}
    fn on_form_error(&self, _errors: &[String]) {}
    fn on_detection_update(&self, _result: &DetectionResult) {}
}

/// Observer list
#[derive(Default)]
pub struct Dispatcher {
    observers: Vec<Box<dyn DetectionObserver>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn DetectionObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one frame's events to every observer
    pub fn publish(&self, events: &[DetectionEvent]) {
        for observer in &self.observers {
            for event in events {
                match event {
                    DetectionEvent::RepDetected(count) => observer.on_rep_detected(*count),
                    DetectionEvent::FormError(errors) => observer.on_form_error(errors),
                    DetectionEvent::Update(result) => observer.on_detection_update(result),
                }
            }
        }
    }
}
