//! ## ticktock-core::time
//! **Capability traits for reading time and waiting on a one-shot timer**
//!
//! Both [`RealClock`] and the simulated clock in `ticktock-simulator`
//! implement [`Clock`], so a component written against these traits never
//! knows which one it was given.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::Receiver;

mod real;
mod system;

pub use real::{RealClock, RealClockBuilder};
pub use system::SystemNow;

/// Source of the current instant.
pub trait Nower: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A one-shot expiring timer.
///
/// Implementations start disarmed: nothing arrives on [`Timer::expiry`] until
/// [`Timer::arm`] has been called. `arm` has no return value; it cancels and
/// drains on a best-effort basis first, which still cannot rule out an expiry
/// that races with it. Callers wanting exact semantics should `cancel` and
/// drain the receiver themselves before re-arming.
pub trait Timer: Send + Sync {
    /// Receiver on which one instant is delivered per expiry.
    fn expiry(&self) -> Receiver<DateTime<Utc>>;

    /// Prevents a pending expiry. Returns `true` if one was pending, `false`
    /// if the timer had already fired, was cancelled or was never armed.
    fn cancel(&self) -> bool;

    /// Schedules an expiry `duration` from now.
    fn arm(&self, duration: Duration);
}

/// Both capabilities together.
pub trait Clock: Nower + Timer {}

impl<T: Nower + Timer + ?Sized> Clock for T {}

/// `at + by`, saturating at the largest representable instant.
pub fn advance(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn advance_adds_duration() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = advance(start, Duration::from_millis(1500));
        assert_eq!(later - start, TimeDelta::milliseconds(1500));
    }

    #[test]
    fn advance_by_zero_is_identity() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(advance(start, Duration::ZERO), start);
    }

    #[test]
    fn advance_saturates() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(advance(start, Duration::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(
            advance(DateTime::<Utc>::MAX_UTC, Duration::from_nanos(1)),
            DateTime::<Utc>::MAX_UTC
        );
    }

    #[test]
    fn clocks_are_object_safe() {
        fn accepts(_: Option<&dyn Clock>) {}
        accepts(None);
    }
}
