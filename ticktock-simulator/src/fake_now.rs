//! # Settable time source
//!
//! The plain [`Nower`] double: no timer, just an instant behind a lock that
//! only moves when the test moves it.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use ticktock_core::Nower;

/// A time source frozen at whatever instant the test last set.
#[derive(Debug, Default)]
pub struct FakeNow {
    current: Mutex<DateTime<Utc>>,
}

impl FakeNow {
    /// Creates a time source frozen at `current`.
    pub fn new(current: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(current),
        }
    }

    /// Replaces the current instant and returns the previous one. Moving
    /// backwards is allowed.
    pub fn set_now(&self, current: DateTime<Utc>) -> DateTime<Utc> {
        std::mem::replace(&mut *self.current.lock(), current)
    }
}

impl Nower for FakeNow {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
