//! # ticktock-core
//!
//! Time as an injected capability. Code that needs "what time is it" or
//! "tell me once a duration has passed" takes a [`Nower`], a [`Timer`] or
//! both (a [`Clock`]) through its constructor instead of reaching for the
//! system clock, so tests can hand it a simulated clock instead.
//!
//! ### Key Submodules:
//! - `time`: capability traits, [`SystemNow`] and the thread-backed [`RealClock`]
//! - `error`: construction failures
//!
//! The simulated counterparts live in `ticktock-simulator`, which production
//! builds never need to depend on.

pub mod error;
pub mod time;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::time::*;
}

pub use error::ClockError;
pub use time::{advance, Clock, Nower, RealClock, SystemNow, Timer};
