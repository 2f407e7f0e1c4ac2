//! Two-pass reconciliation of keyed record collections.

use crate::model::{ChangeEntry, ChangeSet, Record, Snapshot};
use std::collections::{HashMap, HashSet};

/// Reconcile one source's previous and current records.
///
/// Forward pass over `current` emits `New` and `PriceChanged`; a second pass
/// over `previous` emits `Removed` for identities no longer present. Prices
/// compare by exact value, including absence: `None` vs `Some` is a change.
///
/// When `previous` holds an identity more than once, the last occurrence is
/// the one compared and at most one `Removed` is emitted for it.
pub fn reconcile_source(previous: &[Record], current: &[Record]) -> Vec<ChangeEntry> {
    let previous_by_identity: HashMap<&str, &Record> = previous
        .iter()
        .map(|r| (r.identity.as_str(), r))
        .collect();

    let mut entries = Vec::new();

    for record in current {
        match previous_by_identity.get(record.identity.as_str()) {
            None => entries.push(ChangeEntry::New {
                record: record.clone(),
            }),
            Some(prev) if prev.current_price != record.current_price => {
                entries.push(ChangeEntry::PriceChanged {
                    identity: record.identity.clone(),
                    display_name: record.display_name.clone(),
                    old_price: prev.current_price,
                    new_price: record.current_price,
                })
            }
            Some(_) => {}
        }
    }

    let current_identities: HashSet<&str> = current.iter().map(|r| r.identity.as_str()).collect();
    let mut reported: HashSet<&str> = HashSet::new();

    for record in previous {
        let identity = record.identity.as_str();
        if current_identities.contains(identity) || !reported.insert(identity) {
            continue;
        }
        if let Some(last) = previous_by_identity.get(identity) {
            entries.push(ChangeEntry::Removed {
                record: (*last).clone(),
            });
        }
    }

    entries
}

/// Reconcile every source present in `current` against `previous`.
///
/// Sources missing from `previous` count as empty. Sources missing from
/// `current` are skipped entirely. Sources without changes are omitted from
/// the result.
pub fn reconcile(previous: &Snapshot, current: &Snapshot) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for (source, records) in current.iter() {
        let prior = previous.get(source).unwrap_or(&[]);
        changes.insert(source, reconcile_source(prior, records));
    }
    changes
}
