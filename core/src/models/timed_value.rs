//! Time-indexed cumulative values
//!
//! Every mutable quantity in the ledger graph (node balances, edge amounts)
//! is a `TimedValue`: an append-only series of (tick, running total)
//! samples. Attribution queries must be able to reconstruct any past
//! snapshot, so history is never pruned.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical instant on the processor clock
pub type Tick = u64;

/// Errors that can occur updating a timed value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimedValueError {
    #[error("tick {attempted} precedes last recorded tick {last}")]
    TickRegression { last: Tick, attempted: Tick },
}

/// One (tick, cumulative value) sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedValueEntry {
    pub tick: Tick,
    pub value: i64,
}

/// Monotone-time cumulative scalar series
///
/// Ticks strictly increase across stored samples. Updating at the last
/// recorded tick accumulates in place; updating at a newer tick appends a
/// sample carrying the running total forward.
///
/// # Example
/// ```
/// use fund_tracer_core_rs::TimedValue;
///
/// let mut tv = TimedValue::new();
/// tv.update_at(10, 100).unwrap();
/// tv.update_at(10, 100).unwrap(); // same instant accumulates
/// tv.update_at(12, 50).unwrap();
///
/// assert_eq!(tv.value_at(9), 0);
/// assert_eq!(tv.value_at(10), 200);
/// assert_eq!(tv.value_at(11), 200);
/// assert_eq!(tv.current_value(), 250);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedValue {
    entries: Vec<TimedValueEntry>,
}

impl TimedValue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Tick of the oldest sample, if any
    pub fn first_tick(&self) -> Option<Tick> {
        self.entries.first().map(|e| e.tick)
    }

    /// Tick of the newest sample, if any
    pub fn last_tick(&self) -> Option<Tick> {
        self.entries.last().map(|e| e.tick)
    }

    /// All recorded samples, oldest first
    pub fn entries(&self) -> &[TimedValueEntry] {
        &self.entries
    }

    /// Apply `delta` at `tick`.
    ///
    /// Fails with `TickRegression` when `tick` precedes the newest sample.
    pub fn update_at(&mut self, tick: Tick, delta: i64) -> Result<(), TimedValueError> {
        match self.entries.last_mut() {
            None => {
                self.entries.push(TimedValueEntry { tick, value: delta });
                Ok(())
            }
            Some(last) if last.tick == tick => {
                last.value += delta;
                Ok(())
            }
            Some(last) if last.tick < tick => {
                let value = last.value + delta;
                self.entries.push(TimedValueEntry { tick, value });
                Ok(())
            }
            Some(last) => Err(TimedValueError::TickRegression {
                last: last.tick,
                attempted: tick,
            }),
        }
    }

    /// Cumulative value as of `tick`: the newest sample at a tick <= `tick`,
    /// or 0 when `tick` precedes the oldest sample.
    pub fn value_at(&self, tick: Tick) -> i64 {
        match self.entries.binary_search_by(|e| e.tick.cmp(&tick)) {
            Ok(i) => self.entries[i].value,
            Err(0) => 0,
            Err(i) => self.entries[i - 1].value,
        }
    }

    /// Newest cumulative value, 0 when nothing was recorded
    pub fn current_value(&self) -> i64 {
        self.entries.last().map(|e| e.value).unwrap_or(0)
    }
}
