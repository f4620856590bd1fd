//! Ledger edge (aggregated transfer flow)
//!
//! At most one edge per ordered (from, to) pair. An edge aggregates every
//! transfer between the pair: `amount` is the cumulative transferred value
//! and `ticks` lists the logical instants at which the edge was touched.
//! Structure is immutable after creation; only the attributes mutate.

use serde::{Deserialize, Serialize};

use crate::models::timed_value::{Tick, TimedValue, TimedValueError};

use super::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    from: NodeId,
    to: NodeId,
    /// Cumulative amount transferred over this edge
    amount: TimedValue,
    /// Instants at which the edge carried value, strictly increasing
    ticks: Vec<Tick>,
}

impl Edge {
    pub(crate) fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            amount: TimedValue::new(),
            ticks: Vec::new(),
        }
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn amount(&self) -> &TimedValue {
        &self.amount
    }

    pub fn amount_at(&self, tick: Tick) -> i64 {
        self.amount.value_at(tick)
    }

    pub fn current_amount(&self) -> i64 {
        self.amount.current_value()
    }

    /// Instants at which the edge was touched, oldest first
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Newest instant at which the edge was touched
    pub fn latest_tick(&self) -> Option<Tick> {
        self.ticks.last().copied()
    }

    /// Newest touched instant at or before `bound`, if any
    pub fn latest_tick_at_or_before(&self, bound: Tick) -> Option<Tick> {
        match self.ticks.binary_search(&bound) {
            Ok(i) => Some(self.ticks[i]),
            Err(0) => None,
            Err(i) => Some(self.ticks[i - 1]),
        }
    }

    /// Record `amount` flowing over this edge at `tick`.
    pub(crate) fn record(&mut self, tick: Tick, amount: i64) -> Result<(), TimedValueError> {
        self.amount.update_at(tick, amount)?;
        if self.ticks.last() != Some(&tick) {
            self.ticks.push(tick);
        }
        Ok(())
    }
}
