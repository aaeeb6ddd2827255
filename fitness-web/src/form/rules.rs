//! Form rules - externally supplied limits on named metrics
//!
//! Rules arrive as JSON (or a JS object) shaped like
//! `{"elbow_angle": {"min": 90, "max": 180}, "back_straight": {"threshold": 0.95}}`.
//! An empty rule set adds no constraints; the built-in checks of each
//! exercise still run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::report::{FormReport, MetricKind};
use crate::error::DetectionError;

/// Every metric name a validator can produce
pub const KNOWN_METRICS: [&str; 15] = [
    "elbow_angle",
    "knee_angle",
    "hip_angle",
    "front_knee_angle",
    "back_knee_angle",
    "body_line_deviation",
    "leg_line_deviation",
    "back_straight",
    "stability",
    "knee_ankle_offset",
    "knee_toe_offset",
    "shoulder_elbow_offset",
    "hip_knee_gap",
    "hold_offset",
    "symmetry",
];

/// Limits for one metric; any combination may be present
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl RuleBounds {
    pub fn range(min: f32, max: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            threshold: None,
        }
    }

    pub fn at_least(min: f32) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn threshold(threshold: f32) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::default()
        }
    }

    /// Which side of the limits `value` falls on, if outside them
    pub fn violation(&self, value: f32, kind: MetricKind) -> Option<Bound> {
        if self.min.is_some_and(|min| value < min) {
            return Some(Bound::Low);
        }
        if self.max.is_some_and(|max| value > max) {
            return Some(Bound::High);
        }
        match (self.threshold, kind) {
            (Some(t), MetricKind::Deviation) if value > t => Some(Bound::High),
            (Some(t), MetricKind::Angle | MetricKind::Score) if value < t => Some(Bound::Low),
            _ => None,
        }
    }
}

/// Side of a violated limit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Low,
    High,
}

/// Metric name → limits
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRules {
    rules: BTreeMap<String, RuleBounds>,
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DetectionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with(mut self, metric: &str, bounds: RuleBounds) -> Self {
        self.rules.insert(metric.to_string(), bounds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, metric: &str) -> Option<&RuleBounds> {
        self.rules.get(metric)
    }

    /// `(min, max)` for a metric that has a built-in range; rule values
    /// replace the matching built-in ends (`threshold` counts as a floor)
    pub fn range_or(&self, metric: &str, default: (f32, f32)) -> (f32, f32) {
        match self.get(metric) {
            Some(bounds) => (
                bounds.min.or(bounds.threshold).unwrap_or(default.0),
                bounds.max.unwrap_or(default.1),
            ),
            None => default,
        }
    }

    /// Rule names no validator produces; they never fire
    pub fn unknown_metrics(&self) -> Vec<&str> {
        self.rules
            .keys()
            .map(String::as_str)
            .filter(|name| !KNOWN_METRICS.contains(name))
            .collect()
    }

    /// Add a violation for every unjudged metric outside its rule's limits
    pub fn evaluate(&self, report: &mut FormReport) {
        if self.rules.is_empty() {
            return;
        }
        let violations: Vec<String> = report
            .metrics
            .iter()
            .filter(|metric| !metric.ruled)
            .filter_map(|metric| {
                let bound = self.get(metric.name)?.violation(metric.value, metric.kind)?;
                Some(advice(metric.name, bound))
            })
            .collect();
        for message in violations {
            report.fail(message);
        }
    }

    /// Rules the game server falls back to when it cannot generate any
    pub fn defaults_for(exercise: &str) -> Self {
        let name = exercise.to_lowercase();
        if name.contains("push") {
            Self::new().with("elbow_angle", RuleBounds::range(90.0, 180.0))
        } else if name.contains("plank") {
            Self::new()
                .with("back_straight", RuleBounds::threshold(0.95))
                .with("stability", RuleBounds::at_least(0.8))
        } else if name.contains("squat") {
            Self::new().with("knee_angle", RuleBounds::range(90.0, 180.0))
        } else {
            Self::new().with("elbow_angle", RuleBounds::range(90.0, 180.0))
        }
    }
}

/// Short instruction for a violated rule, never quoting the limit itself
pub fn advice(metric: &str, bound: Bound) -> String {
    let text = match (metric, bound) {
        ("elbow_angle", Bound::Low) => "Don't sink too low at the bottom",
        ("elbow_angle", Bound::High) => "Bend your elbows more",
        ("knee_angle", Bound::Low) => "Don't collapse at the bottom; control the descent",
        ("knee_angle", Bound::High) => "Bend your knees more",
        ("hip_angle", Bound::Low) => "Don't fold too far forward",
        ("hip_angle", Bound::High) => "Curl up higher",
        ("front_knee_angle" | "back_knee_angle", Bound::Low) => "Don't drop too low",
        ("front_knee_angle" | "back_knee_angle", Bound::High) => "Lower until both knees bend",
        ("body_line_deviation" | "back_straight", _) => "Keep your back straight",
        ("leg_line_deviation", _) => "Keep your legs straight",
        ("stability" | "hold_offset", _) => "Hold steady: keep your hips level with your shoulders",
        ("knee_ankle_offset", _) => "Keep your knees over your ankles",
        ("knee_toe_offset", _) => "Keep your front knee behind your toes",
        ("shoulder_elbow_offset", _) => "Stack your shoulders over your elbows",
        ("hip_knee_gap", Bound::High) => "Squat deeper",
        ("hip_knee_gap", Bound::Low) => "Don't sink too deep",
        ("symmetry", _) => "Keep your body centred and square to the camera",
        (other, _) => return format!("Adjust your {}", other.replace('_', " ")),
    };
    text.to_string()
}
