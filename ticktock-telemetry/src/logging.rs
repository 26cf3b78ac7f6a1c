//! ## ticktock-telemetry::logging
//! **Structured logging setup built on `tracing`**
//!
//! The clocks only emit `tracing` events; nothing is printed unless the
//! embedding application or test installs a subscriber. `EventLogger` is the
//! one place that does so.

use ticktock_config::TelemetryConfig;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive used when neither `RUST_LOG` nor a configured level is set.
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber at the default level.
    ///
    /// # Panics
    /// If a global subscriber was already installed.
    pub fn init() {
        Self::init_with_level(DEFAULT_LEVEL)
    }

    /// Installs the global subscriber, preferring `RUST_LOG` over `level`.
    ///
    /// # Panics
    /// If a global subscriber was already installed.
    pub fn init_with_level(level: &str) {
        Self::builder(level).init()
    }

    /// Like [`EventLogger::init_with_level`] but reports instead of panicking
    /// when a subscriber is already installed. Returns `true` on success.
    pub fn try_init_with_level(level: &str) -> bool {
        Self::builder(level).try_init().is_ok()
    }

    /// Installs the global subscriber at `config.log_level` unless
    /// `RUST_LOG` is set.
    ///
    /// # Panics
    /// If a global subscriber was already installed.
    pub fn init_from_config(config: &TelemetryConfig) {
        Self::init_with_level(&config.log_level)
    }

    /// Non-panicking [`EventLogger::init_from_config`].
    pub fn try_init_from_config(config: &TelemetryConfig) -> bool {
        Self::try_init_with_level(&config.log_level)
    }

    /// Resolves the active filter: `RUST_LOG` wins, then `level`, then
    /// [`DEFAULT_LEVEL`] when `level` does not parse.
    pub fn filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }

    fn builder(
        level: &str,
    ) -> fmt::SubscriberBuilder<fmt::format::DefaultFields, fmt::format::Format, EnvFilter> {
        fmt()
            .with_env_filter(Self::filter(level))
            // Worker threads are named, which makes timer logs attributable.
            .with_thread_names(true)
            .with_span_events(FmtSpan::NONE)
    }
}
