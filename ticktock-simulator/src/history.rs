//! Arm/cancel history kept by the fake clock.

use std::time::Duration;

/// One recorded call on a simulated timer, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmRecord {
    /// `arm` was called with this duration.
    Armed(Duration),
    /// `cancel` was called.
    Cancelled,
}

impl ArmRecord {
    /// The armed duration, `None` for a cancel.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            ArmRecord::Armed(duration) => Some(*duration),
            ArmRecord::Cancelled => None,
        }
    }
}

/// Duration of the most recent `Armed` entry, skipping any cancels after it.
pub(crate) fn last_armed(history: &[ArmRecord]) -> Option<Duration> {
    history.iter().rev().find_map(ArmRecord::duration)
}
