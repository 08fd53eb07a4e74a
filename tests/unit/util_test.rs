//! Tests for utility functions

use workload_sim::util::{now_ms, Clock, ManualClock, SystemClock};

#[test]
fn test_now_ms_monotonic_enough() {
    let a = now_ms();
    let b = SystemClock.now_ms();
    assert!(b >= a);
}

#[test]
fn test_manual_clock() {
    let clock = ManualClock::new(0);
    clock.advance(1_500);
    assert_eq!(clock.now_ms(), 1_500);
}

#[test]
fn test_init_tracing_is_idempotent() {
    workload_sim::util::init_tracing();
    workload_sim::util::init_tracing();
}

#[test]
fn test_log_filter_defaults_to_info() {
    use workload_sim::util::{parse_env_filter, DEFAULT_LOG_FILTER};

    assert_eq!(parse_env_filter(None).to_string(), DEFAULT_LOG_FILTER);
    assert_eq!(parse_env_filter(Some("info")).to_string(), "info");
    assert_eq!(parse_env_filter(Some("debug")).to_string(), "debug");
    assert_eq!(parse_env_filter(Some("[not a filter")).to_string(), DEFAULT_LOG_FILTER);
}
