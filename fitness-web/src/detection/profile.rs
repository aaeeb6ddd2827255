//! Exercise profiles - selected once by name, then fixed
//!
//! A profile bundles the form validator (required joints, orientation,
//! primary metric, checks) with how its primary metric is scored: a rep
//! machine with a hysteresis band, or a hold timer.

use serde::Serialize;

use crate::error::DetectionError;
use crate::form::{
    ExerciseForm, FrontSquatForm, LungeForm, PlankForm, PushUpForm, SideSquatForm, SitUpForm,
    StaticHoldForm,
};

/// Name fragments that mark a static hold
const STATIC_HOLD_KEYWORDS: [&str; 3] = ["plank", "hold", "static"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    PushUp,
    Squat,
    FrontSquat,
    Lunge,
    Plank,
    SitUp,
    StaticHold,
}

/// Bottom and top of the primary metric. `bottom < top`; a rep goes down
/// at or below `bottom` and comes back up at or above `top`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RepThresholds {
    pub bottom: f32,
    pub top: f32,
}

/// How the primary metric is scored
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionMode {
    Reps(RepThresholds),
    Hold,
}

pub struct ExerciseProfile {
    pub kind: ExerciseKind,
    pub form: &'static dyn ExerciseForm,
    pub mode: MotionMode,
}

// ============================================================================
// PROFILES
// ============================================================================

static PUSH_UP: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::PushUp,
    form: &PushUpForm,
    mode: MotionMode::Reps(RepThresholds {
        bottom: PushUpForm::ELBOW_DOWN,
        top: PushUpForm::ELBOW_UP,
    }),
};

static SQUAT: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::Squat,
    form: &SideSquatForm,
    mode: MotionMode::Reps(RepThresholds {
        bottom: SideSquatForm::KNEE_DOWN,
        top: SideSquatForm::KNEE_UP,
    }),
};

static FRONT_SQUAT: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::FrontSquat,
    form: &FrontSquatForm,
    mode: MotionMode::Reps(RepThresholds {
        bottom: FrontSquatForm::GAP_DOWN,
        top: FrontSquatForm::GAP_UP,
    }),
};

static LUNGE: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::Lunge,
    form: &LungeForm,
    mode: MotionMode::Reps(RepThresholds {
        bottom: LungeForm::KNEE_DOWN,
        top: LungeForm::KNEE_UP,
    }),
};

static PLANK: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::Plank,
    form: &PlankForm,
    mode: MotionMode::Hold,
};

static SIT_UP: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::SitUp,
    form: &SitUpForm,
    mode: MotionMode::Reps(RepThresholds {
        bottom: SitUpForm::HIP_FLEXED,
        top: SitUpForm::HIP_EXTENDED,
    }),
};

static STATIC_HOLD: ExerciseProfile = ExerciseProfile {
    kind: ExerciseKind::StaticHold,
    form: &StaticHoldForm,
    mode: MotionMode::Hold,
};

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 7] = [
        ExerciseKind::PushUp,
        ExerciseKind::Squat,
        ExerciseKind::FrontSquat,
        ExerciseKind::Lunge,
        ExerciseKind::Plank,
        ExerciseKind::SitUp,
        ExerciseKind::StaticHold,
    ];

    /// Resolve a user- or server-supplied exercise name.
    ///
    /// Case, surrounding whitespace, spaces and underscores are ignored, so
    /// "Push Ups", "push_up" and "pushup" all select the push-up.
    pub fn from_name(name: &str) -> Result<Self, DetectionError> {
        let normalized = normalize(name);
        let compact = normalized.replace('-', "");
        let kind = if compact.contains("squat") {
            if compact.contains("front") {
                ExerciseKind::FrontSquat
            } else {
                ExerciseKind::Squat
            }
        } else if compact.contains("push") {
            ExerciseKind::PushUp
        } else if compact.contains("lunge") {
            ExerciseKind::Lunge
        } else if compact.contains("plank") {
            ExerciseKind::Plank
        } else if compact.contains("situp") || compact.contains("crunch") {
            ExerciseKind::SitUp
        } else if is_static_hold_name(&normalized) {
            ExerciseKind::StaticHold
        } else {
            return Err(DetectionError::InvalidConfig(format!(
                "unknown exercise: {:?}",
                name
            )));
        };
        Ok(kind)
    }

    pub fn name(self) -> &'static str {
        self.profile().form.name()
    }

    pub fn profile(self) -> &'static ExerciseProfile {
        match self {
            ExerciseKind::PushUp => &PUSH_UP,
            ExerciseKind::Squat => &SQUAT,
            ExerciseKind::FrontSquat => &FRONT_SQUAT,
            ExerciseKind::Lunge => &LUNGE,
            ExerciseKind::Plank => &PLANK,
            ExerciseKind::SitUp => &SIT_UP,
            ExerciseKind::StaticHold => &STATIC_HOLD,
        }
    }

    pub fn is_static_hold(self) -> bool {
        self.profile().mode == MotionMode::Hold
    }
}

/// Whether a name selects the hold path rather than the rep path
pub fn is_static_hold_name(name: &str) -> bool {
    let normalized = normalize(name);
    STATIC_HOLD_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}
