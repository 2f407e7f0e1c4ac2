//! Classified reconciliation output.

use crate::model::money::Money;
use crate::model::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One classified difference for a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEntry {
    /// Identity not present in the previous snapshot
    New { record: Record },
    /// Same identity, different current price
    PriceChanged {
        identity: String,
        display_name: String,
        old_price: Option<Money>,
        new_price: Option<Money>,
    },
    /// Identity present previously but absent from this run
    Removed { record: Record },
}

/// Tag of a [`ChangeEntry`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    New,
    PriceChanged,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::New => "new",
            ChangeKind::PriceChanged => "price_changed",
            ChangeKind::Removed => "removed",
        }
    }
}

impl ChangeEntry {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEntry::New { .. } => ChangeKind::New,
            ChangeEntry::PriceChanged { .. } => ChangeKind::PriceChanged,
            ChangeEntry::Removed { .. } => ChangeKind::Removed,
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            ChangeEntry::New { record } | ChangeEntry::Removed { record } => &record.identity,
            ChangeEntry::PriceChanged { identity, .. } => identity,
        }
    }
}

/// Changes per source. Sources without changes are never present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    sources: BTreeMap<String, Vec<ChangeEntry>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source's entries; an empty list leaves the set untouched.
    pub fn insert(&mut self, source: impl Into<String>, entries: Vec<ChangeEntry>) {
        if !entries.is_empty() {
            self.sources.insert(source.into(), entries);
        }
    }

    pub fn get(&self, source: &str) -> Option<&[ChangeEntry]> {
        self.sources.get(source).map(|v| v.as_slice())
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.sources.contains_key(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ChangeEntry])> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of sources with at least one change
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Total entries across all sources
    pub fn entry_count(&self) -> usize {
        self.sources.values().map(|v| v.len()).sum()
    }
}
