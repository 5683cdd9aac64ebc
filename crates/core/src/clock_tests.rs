// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn fake_clock_advances_deterministically() {
    let clock = FakeClock::new(100.0);
    assert_eq!(clock.now(), 100.0);
    clock.advance(2.5);
    assert_eq!(clock.now(), 102.5);
}

#[test]
fn system_clock_is_monotonic_increasing_across_calls() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
