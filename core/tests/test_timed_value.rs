//! Tests for TimedValue
//!
//! CRITICAL: All money values are i64 (cents)

use fund_tracer_core_rs::{TimedValue, TimedValueError};

#[test]
fn test_returns_zero_if_nothing_recorded() {
    let tv = TimedValue::new();
    assert_eq!(tv.value_at(10), 0);
    assert_eq!(tv.current_value(), 0);
    assert_eq!(tv.first_tick(), None);
    assert_eq!(tv.last_tick(), None);
}

#[test]
fn test_returns_a_given_value() {
    let mut tv = TimedValue::new();
    tv.update_at(10, 10000).unwrap();
    assert_eq!(tv.value_at(10), 10000);
}

#[test]
fn test_sums_values_at_the_same_instant() {
    let mut tv = TimedValue::new();
    tv.update_at(10, 10000).unwrap();
    tv.update_at(10, 10000).unwrap();
    assert_eq!(tv.value_at(10), 20000);
    assert_eq!(tv.entries().len(), 1);
}

#[test]
fn test_carries_older_values_forward() {
    let mut tv = TimedValue::new();
    tv.update_at(9, 10000).unwrap();
    tv.update_at(10, 10000).unwrap();
    assert_eq!(tv.value_at(10), 20000);
}

#[test]
fn test_retrieves_an_older_value() {
    let mut tv = TimedValue::new();
    tv.update_at(8, 10000).unwrap();
    tv.update_at(9, 10000).unwrap();
    tv.update_at(10, 10000).unwrap();
    assert_eq!(tv.value_at(9), 20000);
}

#[test]
fn test_retrieves_zero_before_the_oldest_entry() {
    let mut tv = TimedValue::new();
    tv.update_at(8, 10000).unwrap();
    tv.update_at(9, 10000).unwrap();
    assert_eq!(tv.value_at(7), 0);
}

#[test]
fn test_retrieves_the_newest_value_after_the_newest_entry() {
    let mut tv = TimedValue::new();
    tv.update_at(8, 10000).unwrap();
    tv.update_at(9, 10000).unwrap();
    tv.update_at(10, 10000).unwrap();
    assert_eq!(tv.value_at(11), 30000);
    assert_eq!(tv.current_value(), 30000);
}

#[test]
fn test_negative_deltas_reduce_the_running_total() {
    let mut tv = TimedValue::new();
    tv.update_at(1, 10000).unwrap();
    tv.update_at(2, -4000).unwrap();
    assert_eq!(tv.value_at(1), 10000);
    assert_eq!(tv.value_at(2), 6000);
}

#[test]
fn test_update_at_rejects_tick_regression() {
    let mut tv = TimedValue::new();
    tv.update_at(10, 10000).unwrap();
    let err = tv.update_at(9, 100).unwrap_err();
    assert_eq!(
        err,
        TimedValueError::TickRegression {
            last: 10,
            attempted: 9
        }
    );
    // the failed update must not leave a trace
    assert_eq!(tv.entries().len(), 1);
    assert_eq!(tv.current_value(), 10000);
}

#[test]
fn test_round_trip_equals_sum_of_deltas() {
    let deltas = [(1u64, 500i64), (1, 250), (3, -100), (7, 42), (9, 0)];
    let mut tv = TimedValue::new();
    let mut total = 0;
    for (tick, delta) in deltas {
        tv.update_at(tick, delta).unwrap();
        total += delta;
    }
    assert_eq!(tv.value_at(9), total);
    assert_eq!(tv.value_at(1000), total);
    assert_eq!(tv.value_at(0), 0);
}
