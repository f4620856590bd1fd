//! Ledger graph with incremental topological-order maintenance
//!
//! A labeled directed graph over account selves. Nodes and edges live in
//! arenas addressed by dense ids, never by shared references. As edges are
//! added one at a time, the graph keeps a total topological order over its
//! nodes and rejects any edge that would close a cycle, in time proportional
//! to the affected region of the order (bounded DFS plus a localized shift).
//!
//! The maintained order is the acyclicity certificate the attribution path
//! builder relies on.

pub mod edge;
pub mod node;
mod order;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use edge::Edge;
use node::{Node, NodeId};
use order::TopoOrder;

/// Errors that can occur mutating the graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("label '{label}' already present in graph '{graph}'")]
    DuplicateLabel { graph: String, label: String },

    #[error("unknown label '{label}' in graph '{graph}'")]
    UnknownLabel { graph: String, label: String },

    #[error("edge '{from}' -> '{to}' already present in graph '{graph}'")]
    DuplicateEdge {
        graph: String,
        from: String,
        to: String,
    },
}

/// Outcome of the bounded cycle search
enum RegionSearch {
    /// Forward-reachable set of the probe node within the region
    Visited(HashSet<NodeId>),
    /// The search reached the edge's origin again
    CycleFound,
}

/// Directed acyclic ledger graph
///
/// # Example
/// ```
/// use fund_tracer_core_rs::LedgerGraph;
///
/// let mut graph = LedgerGraph::new("accounts");
/// graph.add_node("A").unwrap();
/// graph.add_node("B").unwrap();
///
/// assert!(graph.add_edge("A", "B").unwrap().is_some());
/// // the reverse edge would close a cycle and is rejected
/// assert!(graph.add_edge("B", "A").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct LedgerGraph {
    name: String,
    nodes: Vec<Node>,
    labels: HashMap<String, NodeId>,
    edges: HashMap<(NodeId, NodeId), Edge>,
    /// Edge keys in insertion order, for deterministic presentation
    edge_order: Vec<(NodeId, NodeId)>,
    order: TopoOrder,
    allow_cycles: bool,
}

impl LedgerGraph {
    /// Create a graph that maintains the topological order and rejects
    /// cycle-closing edges.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            labels: HashMap::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            order: TopoOrder::new(),
            allow_cycles: false,
        }
    }

    /// Create a graph with order maintenance and cycle rejection disabled.
    ///
    /// Display and testing only: attribution path building refuses graphs
    /// built in this mode.
    pub fn new_allowing_cycles(name: impl Into<String>) -> Self {
        Self {
            allow_cycles: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows_cycles(&self) -> bool {
        self.allow_cycles
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Edges in insertion order
    pub fn edges_in_insertion_order(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().map(|key| &self.edges[key])
    }

    /// Create a node for a label not yet known.
    pub fn add_node(&mut self, label: &str) -> Result<NodeId, GraphError> {
        if self.labels.contains_key(label) {
            return Err(GraphError::DuplicateLabel {
                graph: self.name.clone(),
                label: label.to_string(),
            });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, label.to_string()));
        self.labels.insert(label.to_string(), id);
        self.order.push_node(id);
        Ok(id)
    }

    pub fn node_id_by_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    pub fn get_node_by_label(&self, label: &str) -> Option<&Node> {
        self.node_id_by_label(label).map(|id| &self.nodes[id.index()])
    }

    /// Node lookup by id. Ids are dense and never reused, so any id handed
    /// out by this graph stays valid.
    pub fn get_node_by_id(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn label_of(&self, id: NodeId) -> &str {
        self.nodes[id.index()].label()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn node_mut_by_label(&mut self, label: &str) -> Option<&mut Node> {
        let id = self.node_id_by_label(label)?;
        Some(self.node_mut(id))
    }

    /// Position of a node's label in the maintained order
    pub fn topo_index(&self, label: &str) -> Option<usize> {
        self.node_id_by_label(label).map(|id| self.order.index_of(id))
    }

    pub fn has_edge(&self, from_label: &str, to_label: &str) -> bool {
        self.get_edge(from_label, to_label).is_some()
    }

    pub fn get_edge(&self, from_label: &str, to_label: &str) -> Option<&Edge> {
        let from = self.node_id_by_label(from_label)?;
        let to = self.node_id_by_label(to_label)?;
        self.edges.get(&(from, to))
    }

    pub fn edge_by_ids(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edges.get(&(from, to))
    }

    pub(crate) fn edge_mut(&mut self, key: (NodeId, NodeId)) -> &mut Edge {
        self.edges.get_mut(&key).expect("edge key handed out by add_edge")
    }

    /// Insert the edge `from_label -> to_label`, re-establishing the
    /// topological order over the affected region.
    ///
    /// Returns `Ok(None)` when the edge would close a cycle (self-loops
    /// always would); the graph is then left exactly as it was. Cycle
    /// rejection is an expected outcome, not an error.
    pub fn add_edge(
        &mut self,
        from_label: &str,
        to_label: &str,
    ) -> Result<Option<(NodeId, NodeId)>, GraphError> {
        let from = self.require(from_label)?;
        let to = self.require(to_label)?;
        if from == to {
            return Ok(None);
        }
        if self.edges.contains_key(&(from, to)) {
            return Err(GraphError::DuplicateEdge {
                graph: self.name.clone(),
                from: from_label.to_string(),
                to: to_label.to_string(),
            });
        }

        // Tentatively register the edge, then certify the order still holds.
        self.nodes[from.index()].add_out_edge(to);
        self.nodes[to.index()].add_in_edge(from);
        self.edges.insert((from, to), Edge::new(from, to));
        self.edge_order.push((from, to));

        if !self.allow_cycles {
            let lower = self.order.index_of(to);
            let upper = self.order.index_of(from);
            if lower < upper {
                // The region [lower, upper] may need reordering.
                match self.search_region(to, upper) {
                    RegionSearch::CycleFound => {
                        self.nodes[from.index()].del_out_edge(to);
                        self.nodes[to.index()].del_in_edge(from);
                        self.edges.remove(&(from, to));
                        self.edge_order.pop();
                        return Ok(None);
                    }
                    RegionSearch::Visited(visited) => {
                        self.order.shift_region(lower, upper, &visited);
                    }
                }
            }
        }
        Ok(Some((from, to)))
    }

    /// Bounded DFS from `start` over out-edges, restricted to nodes whose
    /// index is below `upper`. Reaching the index `upper` itself means the
    /// tentative edge closed a cycle.
    fn search_region(&self, start: NodeId, upper: usize) -> RegionSearch {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            for succ in self.nodes[id.index()].out_edges() {
                let index = self.order.index_of(succ);
                if index == upper {
                    return RegionSearch::CycleFound;
                }
                if index < upper && !visited.contains(&succ) {
                    stack.push(succ);
                }
            }
        }
        RegionSearch::Visited(visited)
    }

    /// Verify the acyclicity certificate: the order arrays form a
    /// permutation and every edge points from lower to higher index.
    pub fn is_topologically_consistent(&self) -> bool {
        if self.allow_cycles {
            return false;
        }
        self.order.is_permutation()
            && self.edges.keys().all(|&(from, to)| {
                self.order.index_of(from) < self.order.index_of(to)
            })
    }

    fn require(&self, label: &str) -> Result<NodeId, GraphError> {
        self.node_id_by_label(label).ok_or_else(|| GraphError::UnknownLabel {
            graph: self.name.clone(),
            label: label.to_string(),
        })
    }
}
