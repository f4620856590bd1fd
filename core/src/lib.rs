//! Fund Tracer Core - Transfer Attribution Engine
//!
//! Ingests a chronological sequence of money-movement records (direct
//! deposits and account-to-account transfers) and builds a directed acyclic
//! graph that can answer: of the funds currently held by account X, what
//! fraction ultimately originated from each ancestor account, and through
//! which chain of transfers?
//!
//! # Architecture
//!
//! - **clock**: Logical tick clock driving all bookkeeping
//! - **models**: Domain types (AccountEntry, TimedValue)
//! - **graph**: Ledger graph with incremental topological-order maintenance
//! - **processor**: Entry processing, account splitting, balance bookkeeping
//! - **paths**: Backward attribution-path construction
//! - **report**: Read-only tabular extraction for reporters
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. For every edge (u, v), topological index of u < index of v
//! 3. Money is conserved: at any tick, total balance == total direct input

// Module declarations
pub mod clock;
pub mod graph;
pub mod models;
pub mod paths;
pub mod processor;
pub mod report;

// Re-exports for convenience
pub use clock::LogicalClock;
pub use graph::{
    edge::Edge,
    node::{Node, NodeAttrs, NodeId},
    GraphError, LedgerGraph,
};
pub use models::{
    entry::{AccountEntry, EntryKind, Timestamp},
    timed_value::{Tick, TimedValue, TimedValueEntry, TimedValueError},
};
pub use paths::{AttributionPathBuilder, PathArena, PathError, PathNode, PathRef};
pub use processor::{
    resolver::{LabelResolver, ResolverError},
    EntryProcessor, ProcessorError,
};
pub use report::{balance_rows, path_rows, BalanceRow, PathRow};
