//! Ledger node (account self)
//!
//! One node per distinct, possibly remapped, account label. Nodes are
//! allocated in the graph's arena, addressed by dense ids, and never
//! destroyed. Their attributes are cumulative `TimedValue` series mutated
//! only by the entry processor.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::timed_value::{Tick, TimedValue};

/// Dense node id, assigned at creation and never reused
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-account cumulative attributes
///
/// - `balance`: funds currently held
/// - `inputed`: total direct external deposits
/// - `received`: total inbound transfers
/// - `transferred`: total outbound transfers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub balance: TimedValue,
    pub inputed: TimedValue,
    pub received: TimedValue,
    pub transferred: TimedValue,
}

/// One account self in the ledger graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    label: String,
    in_edges: BTreeSet<NodeId>,
    out_edges: BTreeSet<NodeId>,
    attrs: NodeAttrs,
}

impl Node {
    pub(crate) fn new(id: NodeId, label: String) -> Self {
        Self {
            id,
            label,
            in_edges: BTreeSet::new(),
            out_edges: BTreeSet::new(),
            attrs: NodeAttrs::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Predecessor node ids, ascending
    pub fn in_edges(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges.iter().copied()
    }

    /// Successor node ids, ascending
    pub fn out_edges(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges.iter().copied()
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    pub fn has_out_edge(&self, to: NodeId) -> bool {
        self.out_edges.contains(&to)
    }

    pub fn has_in_edge(&self, from: NodeId) -> bool {
        self.in_edges.contains(&from)
    }

    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut NodeAttrs {
        &mut self.attrs
    }

    pub fn balance_at(&self, tick: Tick) -> i64 {
        self.attrs.balance.value_at(tick)
    }

    pub fn inputed_at(&self, tick: Tick) -> i64 {
        self.attrs.inputed.value_at(tick)
    }

    pub fn received_at(&self, tick: Tick) -> i64 {
        self.attrs.received.value_at(tick)
    }

    pub fn transferred_at(&self, tick: Tick) -> i64 {
        self.attrs.transferred.value_at(tick)
    }

    pub fn current_balance(&self) -> i64 {
        self.attrs.balance.current_value()
    }

    // The graph owns both halves of an adjacency registration; these stay
    // crate-private so structure can only change through `add_edge`.

    pub(crate) fn add_out_edge(&mut self, to: NodeId) {
        debug_assert!(!self.out_edges.contains(&to));
        self.out_edges.insert(to);
    }

    pub(crate) fn add_in_edge(&mut self, from: NodeId) {
        debug_assert!(!self.in_edges.contains(&from));
        self.in_edges.insert(from);
    }

    pub(crate) fn del_out_edge(&mut self, to: NodeId) {
        debug_assert!(self.out_edges.contains(&to));
        self.out_edges.remove(&to);
    }

    pub(crate) fn del_in_edge(&mut self, from: NodeId) {
        debug_assert!(self.in_edges.contains(&from));
        self.in_edges.remove(&from);
    }
}
