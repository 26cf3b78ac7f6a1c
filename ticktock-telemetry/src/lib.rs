//! # Ticktock Telemetry
//!
//! Logging setup and timer metrics shared by the real and simulated clocks.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::TimerMetrics;
