//! Lunge leg alternation
//!
//! The front leg is recorded when a rep goes down and committed when the
//! rep is counted. A rep whose front leg matches the last counted rep's
//! is rejected at the top.

use crate::pose::Side;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LegAlternation {
    last_counted: Option<Side>,
    current: Option<Side>,
}

impl LegAlternation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rep went down leading with `side`
    pub fn descend(&mut self, side: Option<Side>) {
        self.current = side;
    }

    /// The rep in progress leads with the same leg as the last counted one
    pub fn repeats_last(&self) -> bool {
        matches!((self.current, self.last_counted), (Some(a), Some(b)) if a == b)
    }

    /// The rep in progress was counted
    pub fn commit(&mut self) {
        if let Some(side) = self.current.take() {
            self.last_counted = Some(side);
        }
    }

    /// The rep in progress ended without counting
    pub fn abandon(&mut self) {
        self.current = None;
    }

    pub fn last_counted(&self) -> Option<Side> {
        self.last_counted
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
