//! Attribution path construction
//!
//! Walks the ledger DAG backward from a sink account, producing one tree of
//! paths per chronological self the sink ever had. Each path node records
//! the fraction of its predecessor's available funds that flowed along the
//! incoming edge, bounded to a logical-time window so that only transfers
//! that could actually have fed the sink are counted.
//!
//! Paths share common prefixes: they live in an arena as parent-linked
//! nodes, and a path's overall attribution fraction is the product of the
//! per-hop fractions along its root chain.

use serde::Serialize;
use thiserror::Error;

use crate::graph::node::NodeId;
use crate::graph::LedgerGraph;
use crate::models::timed_value::Tick;
use crate::processor::resolver::LabelResolver;

/// Errors that can occur building attribution paths
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("sink label '{label}' has no node in graph '{graph}'")]
    UnknownSink { graph: String, label: String },

    #[error("graph '{graph}' was built in allow-cycles mode; attribution requires the ordered mode")]
    CyclesAllowed { graph: String },

    #[error("attribution chain through '{label}' exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize, label: String },
}

/// Index of a path node in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PathRef(pub u32);

impl PathRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One hop of an attribution path, parent-linked within its tree
///
/// `to_label` is constant across a tree: the sink self the tree was rooted
/// at. `pct` is the per-hop fraction; multiply along the parent chain (see
/// [`PathArena::total_pct`]) for the path's overall attribution fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathNode {
    pub id: PathRef,
    pub from_label: String,
    pub to_label: String,
    pub parent: Option<PathRef>,
    pub root: PathRef,
    pub children: Vec<PathRef>,
    /// Hops from the tree root
    pub length: u32,
    /// Upper logical-time bound of this hop; `None` on tree roots
    pub max_t: Option<Tick>,
    /// Fraction of the predecessor's available funds carried by this hop
    pub pct: f64,
    /// Predecessor attribute snapshots as of `max_t` (current values on roots)
    pub balance: i64,
    pub inputed: i64,
    pub received: i64,
    pub transferred: i64,
}

impl PathNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena of attribution path nodes, one tree per sink self
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathArena {
    paths: Vec<PathNode>,
    roots: Vec<PathRef>,
}

impl PathArena {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, id: PathRef) -> &PathNode {
        &self.paths[id.index()]
    }

    /// All path nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = &PathNode> {
        self.paths.iter()
    }

    /// Tree roots in the order of the sink's resolution chain
    pub fn roots(&self) -> &[PathRef] {
        &self.roots
    }

    /// Overall attribution fraction: product of `pct` along the root chain
    pub fn total_pct(&self, id: PathRef) -> f64 {
        let mut pct = 1.0;
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.get(id);
            pct *= node.pct;
            current = node.parent;
        }
        pct
    }

    /// Pre-order flattening of every tree, roots first within each tree
    pub fn flatten_preorder(&self) -> Vec<PathRef> {
        let mut out = Vec::with_capacity(self.paths.len());
        for &root in &self.roots {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                out.push(id);
                for &child in self.get(id).children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    fn push_root(&mut self, node: PathNode) -> PathRef {
        let id = node.id;
        self.paths.push(node);
        self.roots.push(id);
        id
    }

    fn push_child(&mut self, node: PathNode) -> PathRef {
        let id = node.id;
        let parent = node.parent.expect("child path node has a parent");
        self.paths.push(node);
        self.paths[parent.index()].children.push(id);
        id
    }

    fn next_ref(&self) -> PathRef {
        PathRef(self.paths.len() as u32)
    }
}

/// Builds attribution path trees by walking in-edges backward from a sink
///
/// # Example
/// ```
/// use fund_tracer_core_rs::{
///     AccountEntry, AttributionPathBuilder, EntryProcessor, LedgerGraph,
/// };
///
/// let mut graph = LedgerGraph::new("accounts");
/// let mut processor = EntryProcessor::new();
/// processor.process_entry(&mut graph, &AccountEntry::new("C", None, 10000)).unwrap();
/// processor.process_entry(&mut graph, &AccountEntry::new("A", Some("C"), 2500)).unwrap();
///
/// let arena = AttributionPathBuilder::new()
///     .build_paths(&graph, processor.resolver(), "A")
///     .unwrap();
/// let hop = arena.iter().find(|p| !p.is_root()).unwrap();
/// assert_eq!(hop.from_label, "C");
/// assert!((hop.pct - 0.25).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct AttributionPathBuilder {
    max_depth: usize,
}

struct Frame {
    node: NodeId,
    path: PathRef,
    bound: Option<Tick>,
    depth: usize,
}

impl AttributionPathBuilder {
    /// Default bound on attribution chain length
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Bound the backward walk to `max_depth` hops per chain.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the attribution path trees for `sink_label`.
    ///
    /// The sink may have been split into several chronological selves;
    /// every self that exists as a node becomes the root of its own tree.
    pub fn build_paths(
        &self,
        graph: &LedgerGraph,
        resolver: &LabelResolver,
        sink_label: &str,
    ) -> Result<PathArena, PathError> {
        if graph.allows_cycles() {
            return Err(PathError::CyclesAllowed {
                graph: graph.name().to_string(),
            });
        }

        let mut arena = PathArena::default();
        let mut found_sink = false;
        for self_label in resolver.resolution_chain(sink_label) {
            let Some(sink) = graph.get_node_by_label(&self_label) else {
                continue;
            };
            found_sink = true;
            let root = arena.push_root(PathNode {
                id: arena.next_ref(),
                from_label: self_label.clone(),
                to_label: self_label.clone(),
                parent: None,
                root: arena.next_ref(),
                children: Vec::new(),
                length: 0,
                max_t: None,
                pct: 1.0,
                balance: sink.attrs().balance.current_value(),
                inputed: sink.attrs().inputed.current_value(),
                received: sink.attrs().received.current_value(),
                transferred: sink.attrs().transferred.current_value(),
            });
            self.walk_tree(graph, &mut arena, sink.id(), root, &self_label)?;
        }

        if !found_sink {
            return Err(PathError::UnknownSink {
                graph: graph.name().to_string(),
                label: sink_label.to_string(),
            });
        }
        Ok(arena)
    }

    /// Backward traversal with an explicit worklist; chain depth stays
    /// bounded regardless of graph shape.
    fn walk_tree(
        &self,
        graph: &LedgerGraph,
        arena: &mut PathArena,
        sink: NodeId,
        root: PathRef,
        sink_label: &str,
    ) -> Result<(), PathError> {
        let mut stack = vec![Frame {
            node: sink,
            path: root,
            bound: None,
            depth: 0,
        }];
        while let Some(frame) = stack.pop() {
            let node = graph.get_node_by_id(frame.node);
            let mut descents = Vec::new();
            for pred_id in node.in_edges() {
                if frame.depth + 1 > self.max_depth {
                    return Err(PathError::DepthLimitExceeded {
                        limit: self.max_depth,
                        label: graph.label_of(pred_id).to_string(),
                    });
                }
                let pred = graph.get_node_by_id(pred_id);
                let edge = graph
                    .edge_by_ids(pred_id, frame.node)
                    .expect("in-edge registered without an edge record");

                // this hop's bound: the edge's newest touch within the
                // caller's window
                let bound = match frame.bound {
                    None => edge.latest_tick(),
                    Some(limit) => edge.latest_tick_at_or_before(limit),
                };
                let Some(bound) = bound else {
                    // time-inconsistent edge: the whole branch is discarded
                    continue;
                };
                let amount = edge.amount_at(bound);
                if amount == 0 {
                    continue;
                }
                let denominator = pred.balance_at(bound) + pred.transferred_at(bound);
                // a predecessor with zero visible funds moved money it never
                // held; attribute the entirety to this path (see DESIGN.md)
                let pct = if denominator == 0 {
                    1.0
                } else {
                    amount as f64 / denominator as f64
                };

                let child = arena.push_child(PathNode {
                    id: arena.next_ref(),
                    from_label: pred.label().to_string(),
                    to_label: sink_label.to_string(),
                    parent: Some(frame.path),
                    root,
                    children: Vec::new(),
                    length: frame.depth as u32 + 1,
                    max_t: Some(bound),
                    pct,
                    balance: pred.balance_at(bound),
                    inputed: pred.inputed_at(bound),
                    received: pred.received_at(bound),
                    transferred: pred.transferred_at(bound),
                });
                descents.push(Frame {
                    node: pred_id,
                    path: child,
                    bound: Some(bound),
                    depth: frame.depth + 1,
                });
            }
            // reversed so the lowest-id predecessor is descended first
            for frame in descents.into_iter().rev() {
                stack.push(frame);
            }
        }
        Ok(())
    }
}

impl Default for AttributionPathBuilder {
    fn default() -> Self {
        Self::new()
    }
}
