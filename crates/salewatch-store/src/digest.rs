//! Snapshot digest canonicalization
//!
//! Computes a stable SHA256 digest of a snapshot's sources so corruption and
//! hand edits are detected on load.

use crate::errors::{serialization_error, Result};
use salewatch_core::Snapshot;
use sha2::{Digest, Sha256};

/// Compute the digest of a snapshot's canonical JSON form
///
/// Sources are keyed in name order and records keep their stored order, so
/// equal snapshots always hash equally.
pub fn compute_sources_digest(snapshot: &Snapshot) -> Result<String> {
    let json =
        serde_json::to_string(snapshot).map_err(|e| serialization_error("sources_digest", e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use salewatch_core::Record;

    fn snap(ids: &[&str]) -> Snapshot {
        let records: Vec<Record> = ids.iter().map(|id| Record::new(*id, *id)).collect();
        [("A", records)].into_iter().collect()
    }

    #[test]
    fn test_digest_is_stable() {
        let a = compute_sources_digest(&snap(&["x", "y"])).unwrap();
        let b = compute_sources_digest(&snap(&["x", "y"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_digest_sees_record_order() {
        let a = compute_sources_digest(&snap(&["x", "y"])).unwrap();
        let b = compute_sources_digest(&snap(&["y", "x"])).unwrap();
        assert_ne!(a, b);
    }
}
