//! Entry processing engine (the cycle remover)
//!
//! Consumes accounting entries in arrival order and drives node creation,
//! balance bookkeeping, label remapping and edge insertion into the ledger
//! graph. When a transfer would close a cycle, the destination account is
//! split into a fresh chronological self and its entire balance is carried
//! forward through a synthetic time-transfer edge, keeping the graph acyclic
//! without losing money or temporal information.
//!
//! All mutation is strictly ordered by the input sequence; the logical
//! clock is the sole synchronization mechanism.

pub mod resolver;

use thiserror::Error;

use crate::clock::LogicalClock;
use crate::graph::{node::NodeId, GraphError, LedgerGraph};
use crate::models::entry::{AccountEntry, Timestamp};
use crate::models::timed_value::{Tick, TimedValueError};

use resolver::{LabelResolver, ResolverError};

/// Errors that can occur processing entries
///
/// Structural invariant violations are fatal for the run: processing must
/// stop rather than continue with inconsistent state. Cycle rejection is
/// *not* among them — it is an expected outcome handled by splitting.
#[derive(Debug, Error, PartialEq)]
pub enum ProcessorError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Time(#[from] TimedValueError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error("entry amount must be non-negative, got {amount} into '{destination}'")]
    NegativeAmount { destination: String, amount: i64 },

    #[error("transfer into '{destination}' has no source account")]
    MissingSource { destination: String },

    #[error("batch timestamp {next} precedes previous batch timestamp {prev}")]
    NonMonotonicTimestamp { prev: Timestamp, next: Timestamp },

    #[error("time-transfer edge '{from}' -> '{to}' could not be inserted")]
    TimeTransferEdge { from: String, to: String },

    #[error("transfer '{from}' -> '{to}' still rejected after splitting the destination")]
    UnresolvableCycle { from: String, to: String },
}

/// Processes entries into a ledger graph
///
/// # Example
/// ```
/// use fund_tracer_core_rs::{AccountEntry, EntryProcessor, LedgerGraph};
///
/// let mut graph = LedgerGraph::new("accounts");
/// let mut processor = EntryProcessor::new();
///
/// processor.process_entry(&mut graph, &AccountEntry::new("A", None, 10000)).unwrap();
/// processor.process_entry(&mut graph, &AccountEntry::new("B", Some("A"), 2500)).unwrap();
///
/// let a = graph.get_node_by_label("A").unwrap();
/// assert_eq!(a.current_balance(), 7500);
/// ```
#[derive(Debug, Default)]
pub struct EntryProcessor {
    resolver: LabelResolver,
    clock: LogicalClock,
    last_batch_timestamp: Option<Timestamp>,
}

impl EntryProcessor {
    pub fn new() -> Self {
        Self {
            resolver: LabelResolver::new(),
            clock: LogicalClock::new(),
            last_batch_timestamp: None,
        }
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.resolver
    }

    pub fn resolve(&self, label: &str) -> String {
        self.resolver.resolve(label)
    }

    pub fn resolution_chain(&self, label: &str) -> Vec<String> {
        self.resolver.resolution_chain(label)
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    /// Consume the current tick, advancing the clock unless it is held.
    pub fn tick_once(&mut self) -> Tick {
        self.clock.tick_once()
    }

    /// Create the node for the resolved form of `label` if absent.
    pub fn ensure_node(
        &self,
        graph: &mut LedgerGraph,
        label: &str,
    ) -> Result<NodeId, GraphError> {
        let label = self.resolver.resolve(label);
        match graph.node_id_by_label(&label) {
            Some(id) => Ok(id),
            None => graph.add_node(&label),
        }
    }

    /// Process a single entry at its own fresh ticks.
    pub fn process_entry(
        &mut self,
        graph: &mut LedgerGraph,
        entry: &AccountEntry,
    ) -> Result<(), ProcessorError> {
        self.check_amount(entry)?;
        if let Some(source) = entry.source() {
            self.ensure_node(graph, source)?;
        }
        self.ensure_node(graph, entry.destination())?;
        if entry.is_direct_load() {
            self.process_direct_load(graph, entry)
        } else {
            self.process_transfer(graph, entry)
        }
    }

    /// Book a direct external deposit into the destination's current self.
    pub fn process_direct_load(
        &mut self,
        graph: &mut LedgerGraph,
        entry: &AccountEntry,
    ) -> Result<(), ProcessorError> {
        self.check_amount(entry)?;
        let label = self.resolver.resolve(entry.destination());
        let tick = self.clock.tick_once();
        let node = Self::node_mut(graph, &label)?;
        node.attrs_mut().balance.update_at(tick, entry.amount())?;
        node.attrs_mut().inputed.update_at(tick, entry.amount())?;
        Ok(())
    }

    /// Book an account-to-account transfer, splitting the destination when
    /// the new edge would close a cycle.
    pub fn process_transfer(
        &mut self,
        graph: &mut LedgerGraph,
        entry: &AccountEntry,
    ) -> Result<(), ProcessorError> {
        self.check_amount(entry)?;
        let source_base = entry.source().ok_or_else(|| ProcessorError::MissingSource {
            destination: entry.destination().to_string(),
        })?;
        let src_label = self.resolver.resolve(source_base);
        let dst_label = self.resolver.resolve(entry.destination());
        let amount = entry.amount();
        let tick = self.clock.tick_once();

        // Bookkeeping happens on the pre-split selves, all at one instant.
        // If the edge below closes a cycle, the split carries the credited
        // balance forward to the minted self.
        {
            let src = Self::node_mut(graph, &src_label)?;
            src.attrs_mut().balance.update_at(tick, -amount)?;
            src.attrs_mut().transferred.update_at(tick, amount)?;
        }
        {
            let dst = Self::node_mut(graph, &dst_label)?;
            dst.attrs_mut().balance.update_at(tick, amount)?;
            dst.attrs_mut().received.update_at(tick, amount)?;
        }

        if let Some(edge) = graph.get_edge(&src_label, &dst_label) {
            // existing edge cannot add a cycle
            let key = (edge.from(), edge.to());
            graph.edge_mut(key).record(tick, amount)?;
            return Ok(());
        }
        match graph.add_edge(&src_label, &dst_label)? {
            Some(key) => {
                graph.edge_mut(key).record(tick, amount)?;
            }
            None => {
                // a cycle was created: split the destination and retry
                let minted = self.split_destination(graph, entry.destination())?;
                let key = match graph.get_edge(&src_label, &minted) {
                    // self-transfer lands on the freshly created time edge
                    Some(edge) => (edge.from(), edge.to()),
                    None => graph.add_edge(&src_label, &minted)?.ok_or_else(|| {
                        ProcessorError::UnresolvableCycle {
                            from: src_label.clone(),
                            to: minted.clone(),
                        }
                    })?,
                };
                let retry_tick = self.clock.tick_once();
                graph.edge_mut(key).record(retry_tick, amount)?;
            }
        }
        Ok(())
    }

    /// Split `base`'s current self and carry its entire balance forward
    /// through a synthetic time-transfer edge at one instant.
    fn split_destination(
        &mut self,
        graph: &mut LedgerGraph,
        base: &str,
    ) -> Result<String, ProcessorError> {
        let old_label = self.resolver.resolve(base);
        let minted = self.resolver.split(base)?;
        graph.add_node(&minted)?;

        let balance = Self::node_mut(graph, &old_label)?.current_balance();
        if balance != 0 {
            let tick = self.clock.tick_once();
            let key = graph.add_edge(&old_label, &minted)?.ok_or_else(|| {
                ProcessorError::TimeTransferEdge {
                    from: old_label.clone(),
                    to: minted.clone(),
                }
            })?;
            graph.edge_mut(key).record(tick, balance)?;
            Self::node_mut(graph, &old_label)?
                .attrs_mut()
                .balance
                .update_at(tick, -balance)?;
            let fresh = Self::node_mut(graph, &minted)?;
            fresh.attrs_mut().balance.update_at(tick, balance)?;
            fresh.attrs_mut().received.update_at(tick, balance)?;
        }
        Ok(minted)
    }

    /// Process entries sharing one real-world timestamp as one simultaneous
    /// batch: direct loads first in input order, then transfers sorted by
    /// (destination, source) so that split decisions are deterministic when
    /// simultaneous transfers touch overlapping accounts.
    ///
    /// One boundary tick is reserved before the loads and one before the
    /// transfers; the clock is held within each phase.
    pub fn process_batch(
        &mut self,
        graph: &mut LedgerGraph,
        entries: &[AccountEntry],
    ) -> Result<(), ProcessorError> {
        // validate before any mutation for this batch
        for entry in entries {
            self.check_amount(entry)?;
        }

        let _boundary = self.clock.tick_once();
        self.clock.hold();
        for entry in entries.iter().filter(|e| e.is_direct_load()) {
            self.ensure_node(graph, entry.destination())?;
            self.process_direct_load(graph, entry)?;
        }
        self.clock.release();

        let _boundary = self.clock.tick_once();
        self.clock.hold();
        let mut transfers: Vec<&AccountEntry> =
            entries.iter().filter(|e| !e.is_direct_load()).collect();
        transfers.sort_by(|a, b| {
            (a.destination(), a.source()).cmp(&(b.destination(), b.source()))
        });
        for entry in transfers {
            if let Some(source) = entry.source() {
                self.ensure_node(graph, source)?;
            }
            self.ensure_node(graph, entry.destination())?;
            self.process_transfer(graph, entry)?;
        }
        self.clock.release();
        Ok(())
    }

    /// Process a full entry sequence, batching runs of equal timestamps.
    ///
    /// Timestamps must be non-decreasing across batches; a regressing batch
    /// is rejected before any of its entries mutate the graph.
    pub fn ingest(
        &mut self,
        graph: &mut LedgerGraph,
        entries: &[AccountEntry],
    ) -> Result<(), ProcessorError> {
        let mut start = 0;
        while start < entries.len() {
            let timestamp = entries[start].timestamp();
            let mut end = start + 1;
            while end < entries.len() && entries[end].timestamp() == timestamp {
                end += 1;
            }
            if let Some(timestamp) = timestamp {
                if let Some(prev) = &self.last_batch_timestamp {
                    if timestamp < prev {
                        return Err(ProcessorError::NonMonotonicTimestamp {
                            prev: prev.clone(),
                            next: timestamp.clone(),
                        });
                    }
                }
                self.last_batch_timestamp = Some(timestamp.clone());
            }
            self.process_batch(graph, &entries[start..end])?;
            start = end;
        }
        Ok(())
    }

    fn check_amount(&self, entry: &AccountEntry) -> Result<(), ProcessorError> {
        if entry.amount() < 0 {
            return Err(ProcessorError::NegativeAmount {
                destination: entry.destination().to_string(),
                amount: entry.amount(),
            });
        }
        Ok(())
    }

    fn node_mut<'g>(
        graph: &'g mut LedgerGraph,
        label: &str,
    ) -> Result<&'g mut crate::graph::node::Node, ProcessorError> {
        let name = graph.name().to_string();
        graph
            .node_mut_by_label(label)
            .ok_or(ProcessorError::Graph(GraphError::UnknownLabel {
                graph: name,
                label: label.to_string(),
            }))
    }
}
