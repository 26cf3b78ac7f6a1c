//! ## ticktock-telemetry::metrics
//! **Prometheus counters for timer activity**
//!
//! One recorder is shared (cheaply cloned) by whichever clocks should report
//! into the same registry.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct TimerMetrics {
    pub registry: Registry,
    pub armed: IntCounter,
    pub cancelled: IntCounter,
    pub expired: IntCounter,
}

impl TimerMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let armed = IntCounter::new("ticktock_timer_armed_total", "Timer arm calls")?;
        let cancelled = IntCounter::new("ticktock_timer_cancelled_total", "Timer cancel calls")?;
        let expired = IntCounter::new(
            "ticktock_timer_expired_total",
            "Expiry notifications produced",
        )?;

        registry.register(Box::new(armed.clone()))?;
        registry.register(Box::new(cancelled.clone()))?;
        registry.register(Box::new(expired.clone()))?;

        Ok(Self {
            registry,
            armed,
            cancelled,
            expired,
        })
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    #[inline]
    pub fn record_armed(&self) {
        self.armed.inc();
    }

    #[inline]
    pub fn record_cancelled(&self) {
        self.cancelled.inc();
    }

    #[inline]
    pub fn record_expired(&self) {
        self.expired.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = TimerMetrics::new().unwrap();
        assert_eq!(metrics.armed.get(), 0);
        assert_eq!(metrics.cancelled.get(), 0);
        assert_eq!(metrics.expired.get(), 0);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = TimerMetrics::new().unwrap();
        let shared = metrics.clone();
        shared.record_armed();
        shared.record_armed();
        shared.record_expired();
        assert_eq!(metrics.armed.get(), 2);
        assert_eq!(metrics.expired.get(), 1);
    }

    #[test]
    fn gathers_text_exposition() {
        let metrics = TimerMetrics::new().unwrap();
        metrics.record_cancelled();
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("ticktock_timer_cancelled_total 1"));
        assert!(text.contains("ticktock_timer_armed_total 0"));
    }
}
