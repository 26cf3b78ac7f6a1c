//! # Simulated clock
//!
//! [`FakeClock`] reproduces the observable protocol of a one-shot timer
//! (arm, fire once, cancel, re-arm) without ever measuring elapsed time.
//! The test calls [`FakeClock::deliver_expiry`] where a real timer's
//! background thread would fire.
//!
//! ## Delivery
//!
//! Expiries travel over a zero-capacity channel, so `deliver_expiry` blocks
//! until some consumer receives the value, exactly like a timer whose
//! notification nobody has read yet. There is no timeout: a delivery that no
//! one ever receives blocks forever. Run the driver and the consumer on
//! different threads.
//!
//! ## State
//!
//! | armed | delivering | state      |
//! |-------|------------|------------|
//! | false | false      | idle       |
//! | true  | false      | scheduled  |
//! | true  | true       | delivering |
//!
//! `arm` moves to scheduled from any state, `cancel` and a completed
//! delivery move back to idle. `cancel` while idle only records itself and
//! returns `false`.
//!
//! ## Synchronisation helpers
//!
//! [`FakeClock::arm_events`] and [`FakeClock::cancel_events`] each hold at
//! most one pending signal. Signals raised while the slot is occupied are
//! dropped, so a test that needs to count calls should read
//! [`FakeClock::history`] instead.

use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use ticktock_config::{ConfigError, SimulatorConfig};
use ticktock_core::{advance, ClockError, Nower, Timer};
use ticktock_telemetry::TimerMetrics;
use tracing::{debug, trace};
use validator::Validate;

use crate::history::{last_armed, ArmRecord};

/// Smallest possible bump applied to "now" after a delivery.
const DEFAULT_STEP: Duration = Duration::from_nanos(1);

#[derive(Debug)]
struct FakeState {
    current: DateTime<Utc>,
    history: Vec<ArmRecord>,
    scheduled: bool,
    // Deliveries blocked on the hand-over.
    in_flight: usize,
}

/// A settable time source combined with a simulated one-shot timer.
///
/// Every test builds its own instance; nothing is shared between clocks.
/// All methods take `&self`, so share the clock between a driver and a
/// consumer thread by reference (for example with [`std::thread::scope`]).
///
/// ```
/// use std::time::Duration;
///
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use ticktock_simulator::FakeClock;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let clock = FakeClock::new(start);
/// clock.arm(Duration::from_secs(1));
///
/// std::thread::scope(|s| {
///     let driver = s.spawn(|| clock.deliver_expiry());
///     let fired = clock.expiry().recv().unwrap();
///     assert_eq!(fired, start + TimeDelta::seconds(1));
///     assert_eq!(driver.join().unwrap(), start);
/// });
/// assert!(clock.now() > start + TimeDelta::seconds(1));
/// ```
#[derive(Debug)]
pub struct FakeClock {
    state: Mutex<FakeState>,
    step: Duration,
    expiry_tx: Sender<DateTime<Utc>>,
    expiry_rx: Receiver<DateTime<Utc>>,
    arm_tx: Sender<Duration>,
    arm_rx: Receiver<Duration>,
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
    metrics: Option<TimerMetrics>,
}

impl FakeClock {
    /// Creates an idle clock whose current instant is `current`.
    pub fn new(current: DateTime<Utc>) -> Self {
        Self::with_step(current, DEFAULT_STEP)
    }

    /// Like [`FakeClock::new`], but after each delivery "now" is moved
    /// `step` past the delivered instant instead of one nanosecond. A zero
    /// step is raised to one nanosecond.
    pub fn with_step(current: DateTime<Utc>, step: Duration) -> Self {
        let (expiry_tx, expiry_rx) = channel::bounded(0);
        let (arm_tx, arm_rx) = channel::bounded(1);
        let (cancel_tx, cancel_rx) = channel::bounded(1);

        Self {
            state: Mutex::new(FakeState {
                current,
                history: Vec::new(),
                scheduled: false,
                in_flight: 0,
            }),
            step: step.max(DEFAULT_STEP),
            expiry_tx,
            expiry_rx,
            arm_tx,
            arm_rx,
            cancel_tx,
            cancel_rx,
            metrics: None,
        }
    }

    /// Builds a clock from validated simulator settings.
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, ClockError> {
        config.validate().map_err(ConfigError::from)?;
        Ok(Self::with_step(
            config.start,
            Duration::from_nanos(config.delivery_step_ns),
        ))
    }

    /// Reports arms, cancels and deliveries into `metrics`.
    pub fn with_metrics(mut self, metrics: TimerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.state.lock().current
    }

    /// Replaces the current instant and returns the previous one. Moving
    /// backwards is allowed.
    pub fn set_now(&self, current: DateTime<Utc>) -> DateTime<Utc> {
        std::mem::replace(&mut self.state.lock().current, current)
    }

    /// Records `Armed(duration)` and marks the timer scheduled.
    ///
    /// An expiry that a concurrent [`FakeClock::deliver_expiry`] is still
    /// trying to hand over is taken and discarded here, which lets that
    /// delivery return.
    pub fn arm(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.history.push(ArmRecord::Armed(duration));
        state.scheduled = true;
        let _ = self.expiry_rx.try_recv();
        let _ = self.arm_tx.try_send(duration);
        drop(state);

        if let Some(metrics) = &self.metrics {
            metrics.record_armed();
        }
        debug!(
            duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX),
            "fake timer armed"
        );
    }

    /// Records `Cancelled` and returns whether the timer was scheduled.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock();
        state.history.push(ArmRecord::Cancelled);
        let _ = self.cancel_tx.try_send(());
        let was_armed = std::mem::replace(&mut state.scheduled, false);
        drop(state);

        if let Some(metrics) = &self.metrics {
            metrics.record_cancelled();
        }
        debug!(was_armed, "fake timer cancelled");
        was_armed
    }

    /// Receiver on which [`FakeClock::deliver_expiry`] hands over instants.
    pub fn expiry(&self) -> Receiver<DateTime<Utc>> {
        self.expiry_rx.clone()
    }

    /// Fires the timer and returns "now" as it was before this call.
    ///
    /// The delivered instant is "now" plus the most recently recorded arm
    /// duration, even when that arm was cancelled afterwards, or plus zero if
    /// the clock was never armed. "Now" moves just past the delivered instant
    /// before the hand-over, so a consumer that calls [`FakeClock::now`]
    /// right after receiving always sees a later instant (except at
    /// `DateTime::<Utc>::MAX_UTC`, where arithmetic saturates).
    ///
    /// Blocks until a consumer receives from [`FakeClock::expiry`]. Arms and
    /// cancels racing with a delivery only affect later deliveries.
    pub fn deliver_expiry(&self) -> DateTime<Utc> {
        let (prev, delivered) = {
            let mut state = self.state.lock();
            let duration = last_armed(&state.history).unwrap_or_default();
            let delivered = advance(state.current, duration);
            let prev = std::mem::replace(&mut state.current, advance(delivered, self.step));
            state.in_flight += 1;
            (prev, delivered)
        };
        trace!(delivered_at = %delivered, "delivering fake expiry");

        // The clock owns a receiver, so this only returns once the value was
        // taken by a consumer or drained by `arm`.
        let _ = self.expiry_tx.send(delivered);

        {
            let mut state = self.state.lock();
            state.scheduled = false;
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_expired();
        }
        debug!(delivered_at = %delivered, "fake expiry delivered");
        prev
    }

    /// Whether at least one delivery is currently waiting for its consumer.
    ///
    /// A snapshot only: the answer may be stale by the time it is read. Use
    /// it to poll for a delivery to begin.
    pub fn is_delivering(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    /// Whether the timer is armed and has neither fired nor been cancelled.
    pub fn is_armed(&self) -> bool {
        self.state.lock().scheduled
    }

    /// Copy of every arm and cancel recorded so far, oldest first.
    pub fn history(&self) -> Vec<ArmRecord> {
        self.state.lock().history.clone()
    }

    /// Duration of the most recent arm, ignoring cancels recorded after it.
    /// `None` if the clock was never armed.
    pub fn last_armed(&self) -> Option<Duration> {
        last_armed(&self.state.lock().history)
    }

    /// Signals one pending arm, carrying its duration.
    pub fn arm_events(&self) -> &Receiver<Duration> {
        &self.arm_rx
    }

    /// Signals one pending cancel.
    pub fn cancel_events(&self) -> &Receiver<()> {
        &self.cancel_rx
    }

    /// Discards pending arm and cancel signals.
    pub fn drain_notifications(&self) {
        while self.arm_rx.try_recv().is_ok() {}
        while self.cancel_rx.try_recv().is_ok() {}
    }
}

impl Nower for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        FakeClock::now(self)
    }
}

impl Timer for FakeClock {
    fn expiry(&self) -> Receiver<DateTime<Utc>> {
        FakeClock::expiry(self)
    }

    fn cancel(&self) -> bool {
        FakeClock::cancel(self)
    }

    fn arm(&self, duration: Duration) {
        FakeClock::arm(self, duration)
    }
}
