//! Stale-source policy: what to persist for sources absent from this run.

use crate::model::Snapshot;
use serde::{Deserialize, Serialize};

/// Treatment of sources present in the previous snapshot but missing from the
/// current run (typically an extraction failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Keep the previous records unchanged until the source reports again
    #[default]
    CarryForward,
    /// Persist exactly the sources seen this run
    Drop,
}

/// The snapshot to persist plus the stale sources it was computed around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextSnapshot {
    pub snapshot: Snapshot,
    /// Stale sources with their previous record counts, in name order
    pub stale_sources: Vec<(String, usize)>,
}

/// Compute the snapshot to persist after a run.
///
/// Every source in `current` is taken as-is (full replacement, never a
/// merge). Sources only in `previous` are copied over or left out depending
/// on `policy`.
pub fn next_snapshot(previous: &Snapshot, current: &Snapshot, policy: StalePolicy) -> NextSnapshot {
    let mut snapshot = current.clone();
    let mut stale_sources = Vec::new();

    for (source, records) in previous.iter() {
        if current.contains_source(source) {
            continue;
        }
        stale_sources.push((source.to_string(), records.len()));
        if policy == StalePolicy::CarryForward {
            snapshot.insert_source(source, records.to_vec());
        }
    }

    NextSnapshot {
        snapshot,
        stale_sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn snap(entries: &[(&str, &[&str])]) -> Snapshot {
        entries
            .iter()
            .map(|(name, ids)| {
                (
                    name.to_string(),
                    ids.iter().map(|id| Record::new(*id, *id)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_carry_forward_keeps_unseen_sources() {
        let previous = snap(&[("A", &["a1"]), ("B", &["b1", "b2"])]);
        let current = snap(&[("A", &["a2"])]);

        let next = next_snapshot(&previous, &current, StalePolicy::CarryForward);

        assert_eq!(next.snapshot.get("A").unwrap()[0].identity, "a2");
        assert_eq!(next.snapshot.get("B").unwrap().len(), 2);
        assert_eq!(next.stale_sources, vec![("B".to_string(), 2)]);
    }

    #[test]
    fn test_drop_persists_only_current_sources() {
        let previous = snap(&[("A", &["a1"]), ("B", &["b1"])]);
        let current = snap(&[("A", &["a1"])]);

        let next = next_snapshot(&previous, &current, StalePolicy::Drop);

        assert_eq!(next.snapshot, current);
        assert_eq!(next.stale_sources, vec![("B".to_string(), 1)]);
    }

    #[test]
    fn test_current_sources_replace_not_merge() {
        let previous = snap(&[("A", &["a1", "a2"])]);
        let current = snap(&[("A", &["a3"])]);

        let next = next_snapshot(&previous, &current, StalePolicy::CarryForward);

        let ids: Vec<&str> = next
            .snapshot
            .get("A")
            .unwrap()
            .iter()
            .map(|r| r.identity.as_str())
            .collect();
        assert_eq!(ids, vec!["a3"]);
        assert!(next.stale_sources.is_empty());
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let p: StalePolicy = serde_json::from_str("\"carry_forward\"").unwrap();
        assert_eq!(p, StalePolicy::CarryForward);
        let p: StalePolicy = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(p, StalePolicy::Drop);
    }
}
