//! Simulated clock configuration.
//!
//! Parameters for the fake clock used in tests and deterministic runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Initial instant of a freshly built fake clock (RFC 3339).
    #[serde(default)]
    pub start: DateTime<Utc>,

    /// How far past the delivered instant `now()` moves after a simulated
    /// expiry, in nanoseconds.
    #[serde(default = "default_delivery_step_ns")]
    #[validate(range(min = 1, max = 1_000_000_000))]
    pub delivery_step_ns: u64,
}

fn default_delivery_step_ns() -> u64 {
    1
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            start: DateTime::<Utc>::UNIX_EPOCH,
            delivery_step_ns: default_delivery_step_ns(),
        }
    }
}
