//! Repetition state machine
//!
//! Two states, TOP and DOWN, with a dead zone between the bottom and top
//! thresholds. Going down needs valid form at the bottom; coming back up
//! always returns to TOP but only counts when form is valid at the top.

use serde::Serialize;

use super::profile::RepThresholds;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepState {
    pub rep_count: u32,
    pub is_down: bool,
    pub last_metric_value: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepTransition {
    WentDown,
    CameUp { counted: bool },
}

/// Result of one frame through the machine
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepStep {
    pub state: RepState,
    pub transition: Option<RepTransition>,
}

impl RepState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's primary metric and form validity
    pub fn advance(self, metric: f32, form_valid: bool, band: RepThresholds) -> RepStep {
        let mut state = self;
        state.last_metric_value = Some(metric);

        let transition = if !state.is_down {
            if metric <= band.bottom && form_valid {
                state.is_down = true;
                Some(RepTransition::WentDown)
            } else {
                None
            }
        } else if metric >= band.top {
            state.is_down = false;
            if form_valid {
                state.rep_count += 1;
            }
            Some(RepTransition::CameUp {
                counted: form_valid,
            })
        } else {
            None
        };

        RepStep { state, transition }
    }
}
