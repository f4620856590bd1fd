//! Domain models
//!
//! - `entry`: normalized accounting entries consumed by the processor
//! - `timed_value`: time-indexed cumulative scalars backing every mutable
//!   node and edge attribute

pub mod entry;
pub mod timed_value;

pub use entry::{AccountEntry, EntryKind, Timestamp};
pub use timed_value::{Tick, TimedValue, TimedValueEntry, TimedValueError};
