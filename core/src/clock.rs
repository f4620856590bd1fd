//! Logical clock for entry processing
//!
//! The engine operates on integer ticks, not wall-clock time. The clock is
//! advanced once per processed entry, except while it is held: entries that
//! share one real-world timestamp are processed with the clock held so they
//! are mutually simultaneous in the model.

use serde::{Deserialize, Serialize};

use crate::models::timed_value::Tick;

/// Monotonically non-decreasing tick counter
///
/// # Example
/// ```
/// use fund_tracer_core_rs::LogicalClock;
///
/// let mut clock = LogicalClock::new();
/// assert_eq!(clock.tick_once(), 0);
/// assert_eq!(clock.tick_once(), 1);
///
/// clock.hold();
/// assert_eq!(clock.tick_once(), 2);
/// assert_eq!(clock.tick_once(), 2); // held: same instant
/// clock.release();
/// assert_eq!(clock.tick_once(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalClock {
    /// Next unconsumed tick while running; the shared tick while held
    tick: Tick,
    running: bool,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self {
            tick: 0,
            running: true,
        }
    }

    /// Return the current tick, advancing it when the clock is running.
    ///
    /// While held, repeated calls return the same tick.
    pub fn tick_once(&mut self) -> Tick {
        let t = self.tick;
        if self.running {
            self.tick += 1;
        }
        t
    }

    /// Tick that the next `tick_once` call will return
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Freeze the clock so subsequent `tick_once` calls share one instant.
    pub fn hold(&mut self) {
        self.running = false;
    }

    /// Resume the clock, moving past the held instant if one was consumed.
    pub fn release(&mut self) {
        if !self.running {
            self.running = true;
            self.tick += 1;
        }
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}
