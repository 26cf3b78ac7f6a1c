#[macro_use]
extern crate criterion;

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use criterion::{black_box, Criterion};
use ticktock_simulator::FakeClock;

/// Arm/cancel bookkeeping, no hand-over.
fn benchmark_arm_cancel(c: &mut Criterion) {
    let clock = FakeClock::new(DateTime::<Utc>::UNIX_EPOCH);

    c.bench_function("fake_clock_arm_cancel", |b| {
        b.iter(|| {
            clock.arm(black_box(Duration::from_millis(5)));
            black_box(clock.cancel());
            clock.drain_notifications();
        })
    });
}

/// Full delivery: driver thread blocked on the rendezvous until the bench
/// thread receives.
fn benchmark_delivery(c: &mut Criterion) {
    let clock = FakeClock::new(DateTime::<Utc>::UNIX_EPOCH);
    let expiry = clock.expiry();
    clock.arm(Duration::from_millis(5));

    c.bench_function("fake_clock_deliver_expiry", |b| {
        b.iter(|| {
            thread::scope(|s| {
                s.spawn(|| clock.deliver_expiry());
                black_box(expiry.recv().unwrap());
            })
        })
    });
}

criterion_group!(benches, benchmark_arm_cancel, benchmark_delivery);
criterion_main!(benches);
