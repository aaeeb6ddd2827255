//! Form report - what one validator pass found out about one frame

use serde::Serialize;

use crate::error::DetectionError;
use crate::pose::{PoseLandmark, Side};

/// How a rule's `threshold` applies to a metric
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Degrees, `threshold` is a floor
    Angle,
    /// Relative distance, lower is better, `threshold` is a ceiling
    Deviation,
    /// Quality in `[0,1]`, higher is better, `threshold` is a floor
    Score,
}

/// A named measurement taken from the frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f32,
    pub kind: MetricKind,
    /// Already judged by a built-in check using the rule's bounds
    #[serde(skip)]
    pub(crate) ruled: bool,
}

/// Outcome of one named sub-check
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
}

/// Static-hold signals. Start and stop are separate conditions: a timer
/// starts only when `eligible`, and a running timer stops only on `collapsed`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldSignal {
    pub eligible: bool,
    pub collapsed: bool,
    pub break_reason: Option<String>,
}

impl HoldSignal {
    pub fn collapsed(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            collapsed: true,
            break_reason: Some(reason.into()),
        }
    }
}

/// Validity flag, ordered violations and the measurements behind them
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReport {
    pub errors: Vec<String>,
    pub checks: Vec<Check>,
    pub metrics: Vec<Metric>,
    /// The exercise's primary metric (rep metric, or hold metric)
    pub primary: Option<f32>,
    /// Non-empty when the frame failed validation; nothing else was judged
    pub missing: Vec<PoseLandmark>,
    pub hold: Option<HoldSignal>,
    pub front_leg: Option<Side>,
}

impl FormReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for a frame that could not be judged at all
    pub fn rejected(err: DetectionError) -> Self {
        let mut report = Self::new();
        if let DetectionError::MissingLandmarks { joints } = &err {
            report.missing = joints.clone();
        }
        report.fail(err.to_string());
        report
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn frame_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Record a sub-check; a failure adds its message once
    pub fn check(&mut self, name: &'static str, passed: bool, message: &str) -> bool {
        self.checks.push(Check { name, passed });
        if !passed {
            self.fail(message);
        }
        passed
    }

    /// Record a sub-check that is informational only
    pub fn note(&mut self, name: &'static str, passed: bool) {
        self.checks.push(Check { name, passed });
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }

    /// Record a metric that form rules may judge
    pub fn metric(&mut self, name: &'static str, value: f32, kind: MetricKind) {
        self.push_metric(name, value, kind, false);
    }

    /// Record a metric whose rule bounds were already applied by a built-in check
    pub fn ruled_metric(&mut self, name: &'static str, value: f32, kind: MetricKind) {
        self.push_metric(name, value, kind, true);
    }

    fn push_metric(&mut self, name: &'static str, value: f32, kind: MetricKind, ruled: bool) {
        self.metrics.push(Metric {
            name,
            value,
            kind,
            ruled,
        });
    }

    pub fn metric_value(&self, name: &str) -> Option<f32> {
        self.metrics
            .iter()
            .find(|metric| metric.name == name)
            .map(|metric| metric.value)
    }

    pub fn passed(&self, name: &str) -> Option<bool> {
        self.checks
            .iter()
            .find(|check| check.name == name)
            .map(|check| check.passed)
    }

    /// Why the frame was rejected or judged invalid, `None` when it passed
    pub fn error(&self) -> Option<DetectionError> {
        if !self.missing.is_empty() {
            Some(DetectionError::MissingLandmarks {
                joints: self.missing.clone(),
            })
        } else if self.errors.is_empty() {
            None
        } else {
            Some(DetectionError::FormInvalid(self.errors.clone()))
        }
    }
}
