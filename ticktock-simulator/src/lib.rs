// ticktock-simulator/src/lib.rs

/*!
# Ticktock Simulator

Deterministic stand-ins for the capabilities in `ticktock-core`. Nothing in
here measures real time: the test decides what "now" is and when an armed
timer fires.

## Key Components:
- **FakeNow:** a settable time source.
- **FakeClock:** a settable time source plus a simulated one-shot timer that
  records every arm and cancel, fires only when told to, and exposes its
  internal state for synchronisation.
- **ArmRecord:** one entry of a fake clock's arm/cancel history.

Depend on this crate from `[dev-dependencies]`; production code should only
see the traits in `ticktock-core`.
*/

pub mod fake_clock;
pub mod fake_now;
pub mod history;

pub use fake_clock::FakeClock;
pub use fake_now::FakeNow;
pub use history::ArmRecord;
