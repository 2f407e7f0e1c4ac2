//! Per-source record collections ("world state as of a run").

use crate::model::record::Record;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Mapping from source name to that source's records.
///
/// Sources are kept sorted by name for deterministic output; records keep
/// their insertion order. Identities are unique within a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    sources: BTreeMap<String, Vec<Record>>,
}

/// Collapse duplicate identities: the last-seen record's data wins and sits
/// where the identity was first seen.
pub fn dedup_records(records: Vec<Record>) -> Vec<Record> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Record> = Vec::with_capacity(records.len());
    for record in records {
        match position.get(&record.identity) {
            Some(&idx) => out[idx] = record,
            None => {
                position.insert(record.identity.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a source's records, enforcing identity uniqueness.
    ///
    /// Returns the records previously stored under that name, if any.
    pub fn insert_source(
        &mut self,
        name: impl Into<String>,
        records: Vec<Record>,
    ) -> Option<Vec<Record>> {
        self.sources.insert(name.into(), dedup_records(records))
    }

    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.sources.get(name).map(|v| v.as_slice())
    }

    pub fn contains_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total records across all sources
    pub fn record_count(&self) -> usize {
        self.sources.values().map(|v| v.len()).sum()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<Record>)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (N, Vec<Record>)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (name, records) in iter {
            snapshot.insert_source(name, records);
        }
        snapshot
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sources.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sources = BTreeMap::<String, Vec<Record>>::deserialize(deserializer)?;
        Ok(sources.into_iter().collect())
    }
}
