#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use rust_decimal::Decimal;
use salewatch_core::model::ChangeKind;
use salewatch_core::{next_snapshot, reconcile, Money, Record, Snapshot, StalePolicy};
use std::collections::HashSet;

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        "[a-e]{1,2}",
        "[A-Za-z ]{0,12}",
        proptest::option::of(0i64..100_000),
    )
        .prop_map(|(identity, name, cents)| {
            let record = Record::new(identity, name);
            match cents {
                Some(c) => record.with_price(Money::new(Decimal::new(c, 2))),
                None => record,
            }
        })
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    proptest::collection::btree_map(
        "[A-C]",
        proptest::collection::vec(record_strategy(), 0..8),
        0..4,
    )
    .prop_map(|sources| sources.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_reconcile_is_idempotent(s in snapshot_strategy()) {
        prop_assert!(reconcile(&s, &s).is_empty());
    }

    #[test]
    fn prop_new_and_removed_partition_identities(
        prev in snapshot_strategy(),
        curr in snapshot_strategy(),
    ) {
        let changes = reconcile(&prev, &curr);

        for (source, entries) in changes.iter() {
            prop_assert!(curr.contains_source(source));
            prop_assert!(!entries.is_empty());

            let prev_ids: HashSet<&str> = prev
                .get(source)
                .unwrap_or(&[])
                .iter()
                .map(|r| r.identity.as_str())
                .collect();
            let curr_ids: HashSet<&str> = curr
                .get(source)
                .unwrap()
                .iter()
                .map(|r| r.identity.as_str())
                .collect();

            for entry in entries {
                let id = entry.identity();
                match entry.kind() {
                    ChangeKind::New => {
                        prop_assert!(curr_ids.contains(id) && !prev_ids.contains(id))
                    }
                    ChangeKind::PriceChanged => {
                        prop_assert!(curr_ids.contains(id) && prev_ids.contains(id))
                    }
                    ChangeKind::Removed => {
                        prop_assert!(!curr_ids.contains(id) && prev_ids.contains(id))
                    }
                }
            }
        }
    }

    #[test]
    fn prop_carried_snapshot_reconciles_clean(
        prev in snapshot_strategy(),
        curr in snapshot_strategy(),
    ) {
        let next = next_snapshot(&prev, &curr, StalePolicy::CarryForward).snapshot;

        for name in prev.source_names() {
            prop_assert!(next.contains_source(name));
        }
        prop_assert!(reconcile(&next, &curr).is_empty());
    }
}
