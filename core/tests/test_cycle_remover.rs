//! Tests for the entry processor: label remapping, bookkeeping, splitting
//!
//! CRITICAL: All money values are i64 (cents)

use fund_tracer_core_rs::{
    AccountEntry, EntryProcessor, LedgerGraph, ProcessorError, Timestamp,
};

fn load(dst: &str, amount: i64) -> AccountEntry {
    AccountEntry::new(dst, None, amount)
}

fn transfer(dst: &str, src: &str, amount: i64) -> AccountEntry {
    AccountEntry::new(dst, Some(src), amount)
}

fn process_all(entries: &[AccountEntry]) -> (LedgerGraph, EntryProcessor) {
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();
    for entry in entries {
        processor.process_entry(&mut graph, entry).unwrap();
    }
    (graph, processor)
}

#[test]
fn test_retrieves_an_unmapped_label() {
    let processor = EntryProcessor::new();
    assert_eq!(processor.resolve("A"), "A");
    assert_eq!(processor.resolution_chain("A"), vec!["A"]);
}

#[test]
fn test_split_remaps_a_label() {
    let (_, processor) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 10000),
        transfer("A", "B", 10000), // closes a 2-cycle, splits A
    ]);
    assert_eq!(processor.resolve("A"), "A--1");
    assert_eq!(processor.resolution_chain("A"), vec!["A", "A--1"]);
    assert_eq!(processor.resolve("B"), "B");
}

#[test]
fn test_repeated_splits_chain() {
    let (_, processor) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 5000),
        transfer("A", "B", 5000), // splits A -> A--1
        transfer("B", "A", 2500), // closes A--1 <-> B, splits B -> B--1
        transfer("A", "B", 2500), // closes B--1 <-> A--1, splits A again
    ]);
    assert_eq!(processor.resolve("A"), "A--2");
    assert_eq!(processor.resolve("B"), "B--1");
    assert_eq!(
        processor.resolution_chain("A"),
        vec!["A", "A--1", "A--2"]
    );
}

#[test]
fn test_ensure_node_creates_zeroed_attributes() {
    let mut graph = LedgerGraph::new("test graph");
    let processor = EntryProcessor::new();
    processor.ensure_node(&mut graph, "A").unwrap();

    let node = graph.get_node_by_label("A").unwrap();
    assert_eq!(node.attrs().balance.current_value(), 0);
    assert_eq!(node.attrs().inputed.current_value(), 0);
    assert_eq!(node.attrs().received.current_value(), 0);
    assert_eq!(node.attrs().transferred.current_value(), 0);

    // idempotent
    processor.ensure_node(&mut graph, "A").unwrap();
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_handles_a_direct_loading() {
    let (graph, _) = process_all(&[load("A", 10000)]);
    let node = graph.get_node_by_label("A").unwrap();
    assert_eq!(node.current_balance(), 10000);
    assert_eq!(node.attrs().inputed.current_value(), 10000);
    assert_eq!(node.attrs().received.current_value(), 0);
}

#[test]
fn test_direct_loading_lands_on_the_current_self() {
    // once A is split, later deposits into "A" go to the active self
    let (mut graph, mut processor) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 10000),
        transfer("A", "B", 10000), // splits A -> A--1
    ]);
    processor
        .process_entry(&mut graph, &load("A", 5000))
        .unwrap();

    let old = graph.get_node_by_label("A").unwrap();
    let current = graph.get_node_by_label("A--1").unwrap();
    assert_eq!(old.attrs().inputed.current_value(), 10000);
    assert_eq!(current.attrs().inputed.current_value(), 5000);
    assert_eq!(current.current_balance(), 15000);
}

#[test]
fn test_transfer_moves_balance_and_counters() {
    let (graph, _) = process_all(&[load("A", 10000), transfer("B", "A", 2500)]);
    let a = graph.get_node_by_label("A").unwrap();
    let b = graph.get_node_by_label("B").unwrap();
    assert_eq!(a.current_balance(), 7500);
    assert_eq!(a.attrs().transferred.current_value(), 2500);
    assert_eq!(b.current_balance(), 2500);
    assert_eq!(b.attrs().received.current_value(), 2500);
    assert_eq!(graph.get_edge("A", "B").unwrap().current_amount(), 2500);
}

#[test]
fn test_transfer_reuses_an_existing_edge() {
    let (graph, _) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 2500),
        transfer("B", "A", 2500),
    ]);
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.get_edge("A", "B").unwrap();
    assert_eq!(edge.current_amount(), 5000);
    assert_eq!(edge.ticks().len(), 2);
}

#[test]
fn test_split_carries_the_balance_forward() {
    // A is loaded, pays B, then B pays A back: the reverse edge would close
    // a 2-cycle, so A is split and its just-credited balance carried forward
    let (graph, processor) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 10000),
        transfer("A", "B", 10000),
    ]);

    let a = graph.get_node_by_label("A").unwrap();
    assert_eq!(a.current_balance(), 0);
    assert_eq!(a.attrs().transferred.current_value(), 10000);
    assert_eq!(a.attrs().received.current_value(), 10000);

    let a1 = graph.get_node_by_label("A--1").unwrap();
    assert_eq!(a1.current_balance(), 10000);
    assert_eq!(a1.attrs().received.current_value(), 10000);
    assert_eq!(a1.attrs().transferred.current_value(), 0);

    let b = graph.get_node_by_label("B").unwrap();
    assert_eq!(b.current_balance(), 0);

    // the transfer edge lands on the fresh self; the time-transfer edge
    // carries the old self's balance across
    assert_eq!(graph.get_edge("B", "A--1").unwrap().current_amount(), 10000);
    assert_eq!(graph.get_edge("A", "A--1").unwrap().current_amount(), 10000);
    assert!(!graph.has_edge("B", "A"));
    assert!(graph.is_topologically_consistent());
    assert_eq!(processor.resolve("A"), "A--1");
}

#[test]
fn test_split_without_balance_adds_no_time_edge() {
    // A has nothing left when the cycle closes: nothing to carry forward
    let (graph, _) = process_all(&[
        load("A", 10000),
        transfer("B", "A", 10000),
        transfer("C", "B", 10000),
        transfer("A", "C", 0), // zero-amount cycle closer
    ]);
    assert!(graph.get_node_by_label("A--1").is_some());
    assert!(!graph.has_edge("A", "A--1"));
}

#[test]
fn test_conservation_holds_at_every_tick() {
    let (graph, processor) = process_all(&[
        load("A", 10000),
        load("B", 5000),
        transfer("B", "A", 7500),
        transfer("A", "B", 2000),
        transfer("C", "B", 1000),
        transfer("A", "C", 500),
    ]);
    for tick in 0..=processor.current_tick() {
        let balance: i64 = graph.nodes().map(|n| n.balance_at(tick)).sum();
        let inputed: i64 = graph.nodes().map(|n| n.inputed_at(tick)).sum();
        assert_eq!(balance, inputed, "conservation broken at tick {tick}");
    }
}

#[test]
fn test_negative_amount_is_rejected() {
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();
    let err = processor
        .process_entry(&mut graph, &load("A", -1))
        .unwrap_err();
    assert_eq!(
        err,
        ProcessorError::NegativeAmount {
            destination: "A".to_string(),
            amount: -1
        }
    );
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_transfer_without_source_is_rejected() {
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();
    processor.ensure_node(&mut graph, "A").unwrap();
    let err = processor
        .process_transfer(&mut graph, &load("A", 100))
        .unwrap_err();
    assert_eq!(
        err,
        ProcessorError::MissingSource {
            destination: "A".to_string()
        }
    );
}

#[test]
fn test_batch_entries_share_instants() {
    let ts = Timestamp::new("2023-01-02", "09:00:00");
    let entries = vec![
        load("A", 10000).with_timestamp(ts.clone()),
        load("B", 5000).with_timestamp(ts.clone()),
        transfer("C", "B", 2000).with_timestamp(ts.clone()),
        transfer("C", "A", 3000).with_timestamp(ts),
    ];
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();
    processor.ingest(&mut graph, &entries).unwrap();

    // both loads at one instant, both transfers at a single later instant
    let a_load = graph.get_node_by_label("A").unwrap().attrs().inputed.last_tick();
    let b_load = graph.get_node_by_label("B").unwrap().attrs().inputed.last_tick();
    assert_eq!(a_load, b_load);

    let ac = graph.get_edge("A", "C").unwrap().ticks().to_vec();
    let bc = graph.get_edge("B", "C").unwrap().ticks().to_vec();
    assert_eq!(ac, bc);
    assert!(a_load.unwrap() < ac[0]);
}

#[test]
fn test_batch_transfers_are_processed_in_destination_source_order() {
    // arrival order is hostile; the (destination, source) sort makes the
    // split decision deterministic
    let ts = Timestamp::new("2023-01-02", "09:00:00");
    let entries = vec![
        load("A", 10000).with_timestamp(ts.clone()),
        transfer("B", "A", 4000).with_timestamp(ts.clone()),
        transfer("A", "B", 4000).with_timestamp(ts),
    ];
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();
    processor.ingest(&mut graph, &entries).unwrap();

    // sorted order processes ("A", "B") first: B -> A is the accepted edge
    // and the later A -> B closes the cycle, splitting B
    assert_eq!(processor.resolve("B"), "B--1");
    assert_eq!(processor.resolve("A"), "A");
    assert!(graph.has_edge("B", "A"));
    assert!(graph.has_edge("A", "B--1"));
}

#[test]
fn test_non_monotonic_batch_timestamp_is_rejected_before_mutation() {
    let mut graph = LedgerGraph::new("test graph");
    let mut processor = EntryProcessor::new();

    let first = Timestamp::new("2023-01-02", "10:00:00");
    processor
        .ingest(
            &mut graph,
            &[load("A", 10000).with_timestamp(first.clone())],
        )
        .unwrap();
    let node_count = graph.node_count();

    let stale = Timestamp::new("2023-01-02", "09:00:00");
    let err = processor
        .ingest(&mut graph, &[load("B", 5000).with_timestamp(stale.clone())])
        .unwrap_err();
    assert_eq!(
        err,
        ProcessorError::NonMonotonicTimestamp {
            prev: first,
            next: stale
        }
    );
    assert_eq!(graph.node_count(), node_count);
}

#[test]
fn test_self_transfer_splits_into_a_fresh_self() {
    let (graph, processor) = process_all(&[load("A", 10000), transfer("A", "A", 2500)]);
    assert_eq!(processor.resolve("A"), "A--1");
    // the self-transfer flows over the time-transfer edge
    let edge = graph.get_edge("A", "A--1").unwrap();
    assert!(edge.current_amount() >= 2500);
    let total: i64 = graph.nodes().map(|n| n.current_balance()).sum();
    assert_eq!(total, 10000);
}
