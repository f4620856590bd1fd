//! Read-only tabular extraction
//!
//! The rows a reporter needs to produce its output: final per-account
//! balances and one row per attribution path. The core stops at the row
//! structs — formatting and file writing belong to the caller.

use serde::{Deserialize, Serialize};

use crate::graph::LedgerGraph;
use crate::models::timed_value::Tick;
use crate::paths::PathArena;

/// Final balance row for one account self
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub label: String,
    /// Total direct external deposits, in cents
    pub inputed: i64,
    /// Final balance, in cents
    pub balance: i64,
}

/// One attribution path, flattened for tabular output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRow {
    /// 1-based position in pre-order
    pub path: usize,
    pub from_label: String,
    pub to_label: String,
    /// Overall attribution fraction of the path
    pub pct: f64,
    /// Originator's direct deposits at the path's time bound, in cents
    pub inputed: i64,
    /// Originator's inbound transfers at the path's time bound, in cents
    pub received: i64,
    /// Funds estimated to have reached the sink along this path, in cents
    pub resulting: f64,
    pub max_t: Option<Tick>,
    pub length: u32,
}

/// Final balances for every account self, in node creation order
pub fn balance_rows(graph: &LedgerGraph) -> Vec<BalanceRow> {
    graph
        .nodes()
        .map(|node| BalanceRow {
            label: node.label().to_string(),
            inputed: node.attrs().inputed.current_value(),
            balance: node.current_balance(),
        })
        .collect()
}

/// One row per attribution hop, pre-order, tree roots excluded
pub fn path_rows(arena: &PathArena) -> Vec<PathRow> {
    arena
        .flatten_preorder()
        .into_iter()
        .filter(|&id| !arena.get(id).is_root())
        .enumerate()
        .map(|(i, id)| {
            let node = arena.get(id);
            let pct = arena.total_pct(id);
            PathRow {
                path: i + 1,
                from_label: node.from_label.clone(),
                to_label: node.to_label.clone(),
                pct,
                inputed: node.inputed,
                received: node.received,
                resulting: node.received as f64 + node.inputed as f64 * pct,
                max_t: node.max_t,
                length: node.length,
            }
        })
        .collect()
}
