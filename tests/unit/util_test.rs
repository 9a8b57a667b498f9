//! Tests for utility functions

use std::time::Duration;

use budget_relay::util::{add_ms, init_tracing, now_ms};

#[test]
fn test_add_ms_saturates() {
    assert_eq!(add_ms(u128::MAX - 1, Duration::from_secs(1)), u128::MAX);
    assert_eq!(add_ms(1_000, Duration::from_millis(250)), 1_250);
}

#[test]
fn test_now_is_monotone_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing();
    init_tracing();
}
