#![allow(clippy::unwrap_used, clippy::expect_used)]

use salewatch_core::model::ChangeKind;
use salewatch_core::{reconcile, ChangeEntry, Money, Record, Snapshot};
use std::str::FromStr;

fn money(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

fn priced(identity: &str, price: &str) -> Record {
    Record::new(identity, format!("item {}", identity)).with_price(money(price))
}

fn snapshot(entries: Vec<(&str, Vec<Record>)>) -> Snapshot {
    entries.into_iter().collect()
}

#[test]
fn test_first_run_reports_everything_new() {
    let current = snapshot(vec![("A", vec![priced("x", "10.00"), priced("y", "5.00")])]);

    let changes = reconcile(&Snapshot::new(), &current);

    let entries = changes.get("A").unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind() == ChangeKind::New));
    assert_eq!(entries[0].identity(), "x");
    assert_eq!(entries[1].identity(), "y");
}

#[test]
fn test_price_change_detected() {
    let previous = snapshot(vec![("A", vec![priced("x", "10.00")])]);
    let current = snapshot(vec![("A", vec![priced("x", "8.00")])]);

    let changes = reconcile(&previous, &current);

    assert_eq!(
        changes.get("A").unwrap(),
        &[ChangeEntry::PriceChanged {
            identity: "x".to_string(),
            display_name: "item x".to_string(),
            old_price: Some(money("10.00")),
            new_price: Some(money("8.00")),
        }]
    );
}

#[test]
fn test_equal_decimal_values_are_not_a_change() {
    let previous = snapshot(vec![("A", vec![priced("x", "10")])]);
    let current = snapshot(vec![("A", vec![priced("x", "10.00")])]);

    assert!(reconcile(&previous, &current).is_empty());
}

#[test]
fn test_name_change_alone_is_not_reported() {
    let previous = snapshot(vec![("A", vec![priced("x", "10.00")])]);
    let renamed = Record::new("x", "Renamed").with_price(money("10.00"));
    let current = snapshot(vec![("A", vec![renamed])]);

    assert!(reconcile(&previous, &current).is_empty());
}

#[test]
fn test_removal_detected() {
    let previous = snapshot(vec![("A", vec![priced("x", "1"), priced("y", "2")])]);
    let current = snapshot(vec![("A", vec![priced("y", "2")])]);

    let changes = reconcile(&previous, &current);

    let entries = changes.get("A").unwrap();
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        ChangeEntry::Removed { record } => assert_eq!(record.identity, "x"),
        other => panic!("expected Removed, got {:?}", other),
    }
}

#[test]
fn test_emission_order_new_and_changed_then_removed() {
    let previous = snapshot(vec![(
        "A",
        vec![priced("r1", "1"), priced("c", "5"), priced("r2", "1")],
    )]);
    let current = snapshot(vec![("A", vec![priced("n", "3"), priced("c", "4")])]);

    let changes = reconcile(&previous, &current);

    let order: Vec<(ChangeKind, &str)> = changes
        .get("A")
        .unwrap()
        .iter()
        .map(|e| (e.kind(), e.identity()))
        .collect();
    assert_eq!(
        order,
        vec![
            (ChangeKind::New, "n"),
            (ChangeKind::PriceChanged, "c"),
            (ChangeKind::Removed, "r1"),
            (ChangeKind::Removed, "r2"),
        ]
    );
}

#[test]
fn test_unchanged_source_is_omitted() {
    let previous = snapshot(vec![
        ("A", vec![priced("x", "1")]),
        ("B", vec![priced("y", "2")]),
    ]);
    let current = snapshot(vec![
        ("A", vec![priced("x", "1")]),
        ("B", vec![priced("y", "3")]),
    ]);

    let changes = reconcile(&previous, &current);

    assert!(!changes.contains_source("A"));
    assert!(changes.contains_source("B"));
    assert_eq!(changes.source_count(), 1);
}

#[test]
fn test_source_missing_from_current_is_not_reported_removed() {
    let previous = snapshot(vec![
        ("A", vec![priced("x", "1")]),
        ("B", vec![priced("y", "2"), priced("z", "3")]),
    ]);
    let current = snapshot(vec![("A", vec![priced("x", "1")])]);

    let changes = reconcile(&previous, &current);

    assert!(changes.is_empty());
}

#[test]
fn test_source_emptied_reports_all_removed() {
    let previous = snapshot(vec![("A", vec![priced("x", "1"), priced("y", "2")])]);
    let current = snapshot(vec![("A", Vec::new())]);

    let changes = reconcile(&previous, &current);

    let entries = changes.get("A").unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind() == ChangeKind::Removed));
}

#[test]
fn test_price_appearing_or_vanishing_is_a_change() {
    let previous = snapshot(vec![(
        "A",
        vec![Record::new("x", "x"), priced("y", "2")],
    )]);
    let current = snapshot(vec![(
        "A",
        vec![priced("x", "1"), Record::new("y", "y")],
    )]);

    let changes = reconcile(&previous, &current);

    let entries = changes.get("A").unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind() == ChangeKind::PriceChanged));
}

#[test]
fn test_inputs_are_not_mutated() {
    let previous = snapshot(vec![("A", vec![priced("x", "1")])]);
    let current = snapshot(vec![("A", vec![priced("y", "2")])]);
    let (prev_before, curr_before) = (previous.clone(), current.clone());

    let _ = reconcile(&previous, &current);

    assert_eq!(previous, prev_before);
    assert_eq!(current, curr_before);
}

#[test]
fn test_duplicate_identities_collapse_before_reconciling() {
    let current = snapshot(vec![(
        "A",
        vec![priced("x", "1"), priced("y", "2"), priced("x", "3")],
    )]);

    let records = current.get("A").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].identity, "x");
    assert_eq!(records[0].current_price, Some(money("3")));

    let changes = reconcile(&Snapshot::new(), &current);
    assert_eq!(changes.get("A").unwrap().len(), 2);
}
