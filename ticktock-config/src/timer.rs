//! Real timer configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TimerConfig {
    /// Name given to each real clock's worker thread.
    #[serde(default = "default_thread_name")]
    #[validate(custom(function = validation::validate_thread_name))]
    pub thread_name: String,
}

fn default_thread_name() -> String {
    "ticktock-timer".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
        }
    }
}
