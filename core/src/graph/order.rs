//! Topological order bookkeeping
//!
//! Two dense permutation arrays over node ids. The maintained invariant —
//! for every edge (u, v), `index_of(u) < index_of(v)` — is the graph's
//! acyclicity certificate. The graph runs the bounded cycle search itself;
//! this module owns the arrays and the localized region shift.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TopoOrder {
    /// node id -> position in the order
    node_to_index: Vec<usize>,
    /// position -> node id
    index_to_node: Vec<NodeId>,
}

impl TopoOrder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.index_to_node.len()
    }

    /// Append a freshly created node as the new maximal element.
    ///
    /// With no edges yet the extended order is trivially consistent.
    pub(crate) fn push_node(&mut self, id: NodeId) {
        debug_assert_eq!(id.index(), self.len());
        self.node_to_index.push(self.len());
        self.index_to_node.push(id);
    }

    pub(crate) fn index_of(&self, id: NodeId) -> usize {
        self.node_to_index[id.index()]
    }

    pub(crate) fn node_at(&self, position: usize) -> NodeId {
        self.index_to_node[position]
    }

    /// Reassign positions `lower..=upper` so that every node in `deferred`
    /// (the region's forward-reachable set) sits after everything else.
    ///
    /// Both partitions keep the relative order in which the walk over the
    /// region encounters them, so ordering constraints outside the affected
    /// set are untouched.
    pub(crate) fn shift_region(&mut self, lower: usize, upper: usize, deferred: &HashSet<NodeId>) {
        let mut kept = Vec::new();
        let mut tail = Vec::new();
        for position in lower..=upper {
            let id = self.index_to_node[position];
            if deferred.contains(&id) {
                tail.push(id);
            } else {
                kept.push(id);
            }
        }
        for (offset, id) in kept.into_iter().chain(tail).enumerate() {
            let position = lower + offset;
            self.index_to_node[position] = id;
            self.node_to_index[id.index()] = position;
        }
    }

    /// True when the arrays are mutually inverse permutations.
    pub(crate) fn is_permutation(&self) -> bool {
        self.index_to_node
            .iter()
            .enumerate()
            .all(|(position, id)| self.node_to_index[id.index()] == position)
    }
}
