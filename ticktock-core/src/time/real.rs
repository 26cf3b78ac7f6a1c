//! ## ticktock-core::time::real
//! **One-shot timer backed by a dedicated worker thread**
//!
//! Each [`RealClock`] owns one named thread that sleeps in a
//! `crossbeam::channel::select!` until either the armed deadline passes or it
//! is woken because the schedule changed. Expiries go out on a channel with
//! capacity one without blocking: an unread expiry is kept and a later one is
//! dropped, the same as a native one-shot timer channel.
//!
//! A firing and a concurrent [`Timer::cancel`] still race. `cancel` may return
//! `false` because the worker got there first, in which case the expiry is
//! already sitting in the channel. This is inherent to the contract.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam::channel::{self, select, Receiver, Sender};
use parking_lot::Mutex;
use ticktock_config::{ConfigError, TimerConfig};
use ticktock_telemetry::TimerMetrics;
use tracing::{debug, trace, warn};
use validator::Validate;

use super::{Nower, Timer};
use crate::error::ClockError;

/// Stand-in deadline for durations that overflow `Instant`. If even this
/// overflows the timer is left armed without a deadline.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

const DEFAULT_THREAD_NAME: &str = "ticktock-timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deadline {
    // `None` when the duration is too large to represent; never fires.
    at: Option<Instant>,
    // Distinguishes re-arms that land on the same instant.
    generation: u64,
}

#[derive(Debug, Default)]
struct Schedule {
    deadline: Option<Deadline>,
    generation: u64,
    shutdown: bool,
}

struct Shared {
    schedule: Mutex<Schedule>,
    expiry_tx: Sender<DateTime<Utc>>,
    metrics: Option<TimerMetrics>,
}

impl Shared {
    fn fire(&self, expected: Deadline) {
        let mut schedule = self.schedule.lock();
        if schedule.deadline != Some(expected) {
            // Re-armed or cancelled while the worker was waking up.
            return;
        }
        schedule.deadline = None;

        if let Some(metrics) = &self.metrics {
            metrics.record_expired();
        }

        let at = Utc::now();
        // Sent under the lock so that a cancel observing `deadline == None`
        // also observes the expiry in the channel.
        if self.expiry_tx.try_send(at).is_err() {
            trace!(%at, "expiry dropped, previous one still unread");
        } else {
            trace!(%at, "timer fired");
        }
    }
}

/// Real time source plus a thread-backed one-shot timer.
///
/// Starts disarmed. Dropping the clock stops and joins its worker thread.
pub struct RealClock {
    shared: Arc<Shared>,
    wake_tx: Sender<()>,
    expiry_rx: Receiver<DateTime<Utc>>,
    worker: Option<JoinHandle<()>>,
}

/// Configures and spawns a [`RealClock`].
#[derive(Debug, Clone)]
pub struct RealClockBuilder {
    thread_name: String,
    metrics: Option<TimerMetrics>,
}

impl Default for RealClockBuilder {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.into(),
            metrics: None,
        }
    }
}

impl RealClockBuilder {
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn metrics(mut self, metrics: TimerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<RealClock, ClockError> {
        let (expiry_tx, expiry_rx) = channel::bounded(1);
        let (wake_tx, wake_rx) = channel::bounded(1);

        let shared = Arc::new(Shared {
            schedule: Mutex::new(Schedule::default()),
            expiry_tx,
            metrics: self.metrics,
        });

        let worker = thread::Builder::new().name(self.thread_name).spawn({
            let shared = Arc::clone(&shared);
            move || run_worker(&shared, &wake_rx)
        })?;

        Ok(RealClock {
            shared,
            wake_tx,
            expiry_rx,
            worker: Some(worker),
        })
    }
}

impl RealClock {
    /// Spawns a disarmed clock with default settings.
    pub fn new() -> Result<Self, ClockError> {
        Self::builder().build()
    }

    pub fn builder() -> RealClockBuilder {
        RealClockBuilder::default()
    }

    /// Spawns a disarmed clock after validating `config`.
    pub fn from_config(config: &TimerConfig) -> Result<Self, ClockError> {
        config.validate().map_err(ConfigError::from)?;
        Self::builder()
            .thread_name(config.thread_name.clone())
            .build()
    }

    fn wake(&self) {
        // Full means a wake-up is already queued; the worker re-reads the
        // schedule either way.
        let _ = self.wake_tx.try_send(());
    }
}

impl Nower for RealClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Timer for RealClock {
    fn expiry(&self) -> Receiver<DateTime<Utc>> {
        self.expiry_rx.clone()
    }

    fn cancel(&self) -> bool {
        let was_armed = self.shared.schedule.lock().deadline.take().is_some();
        if let Some(metrics) = &self.shared.metrics {
            metrics.record_cancelled();
        }
        debug!(was_armed, "timer cancelled");
        self.wake();
        was_armed
    }

    fn arm(&self, duration: Duration) {
        let now = Instant::now();
        let at = now
            .checked_add(duration)
            .or_else(|| now.checked_add(FAR_FUTURE));
        {
            let mut schedule = self.shared.schedule.lock();
            if schedule.deadline.take().is_none() {
                // Already fired or never armed: discard an expiry nobody read.
                let _ = self.expiry_rx.try_recv();
            }
            schedule.generation = schedule.generation.wrapping_add(1);
            schedule.deadline = Some(Deadline {
                at,
                generation: schedule.generation,
            });
        }
        if let Some(metrics) = &self.shared.metrics {
            metrics.record_armed();
        }
        debug!(
            duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX),
            "timer armed"
        );
        self.wake();
    }
}

impl Drop for RealClock {
    fn drop(&mut self) {
        self.shared.schedule.lock().shutdown = true;
        self.wake();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("timer worker panicked");
            }
        }
    }
}

fn run_worker(shared: &Shared, wake_rx: &Receiver<()>) {
    debug!("timer worker started");
    loop {
        let pending = {
            let schedule = shared.schedule.lock();
            if schedule.shutdown {
                break;
            }
            schedule.deadline
        };

        let timeout = match pending.and_then(|deadline| deadline.at) {
            Some(at) => channel::at(at),
            None => channel::never(),
        };

        let keep_running = select! {
            recv(wake_rx) -> msg => msg.is_ok(),
            recv(timeout) -> _ => {
                if let Some(deadline) = pending {
                    shared.fire(deadline);
                }
                true
            }
        };
        if !keep_running {
            break;
        }
    }
    debug!("timer worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use crate::time::Clock;
    use tracing_test::traced_test;

    const WAIT: Duration = Duration::from_secs(5);

    fn wait_until_fired(rx: &Receiver<DateTime<Utc>>) {
        let started = Instant::now();
        while rx.is_empty() {
            assert!(started.elapsed() < WAIT, "timer never fired");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn starts_disarmed() {
        let clock = RealClock::new().unwrap();
        assert!(!clock.cancel());
        assert!(clock.expiry().try_recv().is_err());
    }

    #[test]
    fn fires_once_after_arm() {
        let clock = RealClock::new().unwrap();
        let rx = clock.expiry();

        clock.arm(Duration::from_nanos(1));
        let fired_at = rx.recv_timeout(WAIT).expect("timer should fire");
        assert!(fired_at <= Utc::now());

        assert!(rx.recv_timeout(Duration::from_millis(20)).is_err());
        assert!(!clock.cancel());
    }

    #[test]
    fn cancel_intercepts_pending_expiry() {
        let clock = RealClock::new().unwrap();
        clock.arm(Duration::from_secs(60));
        assert!(clock.cancel());
        assert!(!clock.cancel());
        assert!(clock.expiry().try_recv().is_err());
    }

    #[test]
    fn cancel_after_firing_reports_false() {
        let clock = RealClock::new().unwrap();
        let rx = clock.expiry();
        clock.arm(Duration::ZERO);
        wait_until_fired(&rx);
        assert!(!clock.cancel());
        assert!(!clock.cancel());
    }

    #[test]
    fn rearm_drains_unread_expiry() {
        let clock = RealClock::new().unwrap();
        let rx = clock.expiry();

        clock.arm(Duration::ZERO);
        wait_until_fired(&rx);

        clock.arm(Duration::from_secs(3600));
        assert!(rx.is_empty());
        assert!(clock.cancel());
    }

    #[test]
    fn rearm_replaces_deadline() {
        let clock = RealClock::new().unwrap();
        let rx = clock.expiry();

        clock.arm(Duration::from_secs(3600));
        let armed_at = Utc::now();
        clock.arm(Duration::from_millis(1));

        let fired_at = rx.recv_timeout(WAIT).expect("re-armed timer should fire");
        assert!(fired_at - armed_at < TimeDelta::seconds(3600));
    }

    #[test]
    fn huge_durations_do_not_panic() {
        let clock = RealClock::new().unwrap();
        clock.arm(Duration::MAX);
        assert!(clock.expiry().recv_timeout(Duration::from_millis(20)).is_err());
        assert!(clock.cancel());
    }

    #[test]
    fn records_metrics() {
        let metrics = TimerMetrics::new().unwrap();
        let clock = RealClock::builder()
            .metrics(metrics.clone())
            .build()
            .unwrap();
        let rx = clock.expiry();

        clock.arm(Duration::ZERO);
        rx.recv_timeout(WAIT).expect("timer should fire");
        clock.cancel();

        assert_eq!(metrics.armed.get(), 1);
        assert_eq!(metrics.cancelled.get(), 1);
        assert_eq!(metrics.expired.get(), 1);
    }

    #[test]
    fn from_config_rejects_invalid_thread_name() {
        let config = TimerConfig {
            thread_name: String::new(),
        };
        assert!(matches!(
            RealClock::from_config(&config),
            Err(ClockError::Config(_))
        ));
        assert!(RealClock::from_config(&TimerConfig::default()).is_ok());
    }

    #[test]
    fn substitutable_behind_clock_trait() {
        fn wait_once(clock: &dyn Clock, after: Duration) -> DateTime<Utc> {
            let start = clock.now();
            clock.arm(after);
            let fired = clock.expiry().recv_timeout(WAIT).expect("timer should fire");
            assert!(fired >= start);
            fired
        }

        let clock = RealClock::new().unwrap();
        wait_once(&clock, Duration::from_millis(2));
    }

    #[traced_test]
    #[test]
    fn logs_arm_and_cancel() {
        let clock = RealClock::new().unwrap();
        clock.arm(Duration::from_secs(60));
        clock.cancel();
        assert!(logs_contain("timer armed"));
        assert!(logs_contain("was_armed=true"));
    }

    #[traced_test]
    #[test]
    fn logs_saturated_duration() {
        let clock = RealClock::new().unwrap();
        clock.arm(Duration::MAX);
        clock.cancel();
        assert!(logs_contain(&format!("duration_ns={}", u64::MAX)));
    }
}
