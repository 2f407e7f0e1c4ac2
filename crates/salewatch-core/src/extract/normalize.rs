//! Per-source normalization applied between a producer and the reconciler.

use super::SnapshotSource;
use crate::context::RunContext;
use crate::errors::Result;
use crate::model::record::ATTR_STORE;
use crate::model::Record;
use rust_decimal::Decimal;
use std::cell::Cell;

/// Source name for one retailer category, e.g. `"Zumiez_Wheels"`.
pub fn compose_source_name(store: &str, category: &str) -> String {
    format!("{}_{}", store.trim(), category.trim())
}

/// Stamp the retailer name on a record unless the producer already did.
pub fn stamp_store(record: &mut Record, store: &str) {
    record
        .attributes
        .entry(ATTR_STORE.to_string())
        .or_insert_with(|| store.to_string());
}

fn origin(base: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = base.split_once("://")?;
    let host_end = rest.find('/').unwrap_or(rest.len());
    Some((scheme, &base[..scheme.len() + 3 + host_end]))
}

/// Resolve a listing link against the source's base URL.
///
/// Absolute links are returned unchanged. Root-relative and
/// protocol-relative links take the base's origin and scheme; other relative
/// links are joined to the base's directory.
pub fn absolutize_identity(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() || href.contains("://") {
        return href.to_string();
    }
    let Some((scheme, origin)) = origin(base) else {
        return href.to_string();
    };

    if let Some(rest) = href.strip_prefix("//") {
        return format!("{}://{}", scheme, rest);
    }
    if href.starts_with('/') {
        return format!("{}{}", origin, href);
    }

    let path = &base[origin.len()..];
    let dir = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    };
    format!("{}{}{}", origin, dir, href)
}

/// Minimum discount a listing needs to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountFilter {
    pub min_percent_off: Decimal,
}

impl DiscountFilter {
    pub fn new(min_percent_off: Decimal) -> Self {
        Self { min_percent_off }
    }

    /// Listings without a computable discount never pass.
    pub fn accepts(&self, record: &Record) -> bool {
        record
            .percent_off()
            .is_some_and(|pct| pct >= self.min_percent_off)
    }

    /// Keep the accepted records, returning how many were dropped.
    pub fn apply(&self, records: &mut Vec<Record>) -> usize {
        let before = records.len();
        records.retain(|r| self.accepts(r));
        before - records.len()
    }
}

/// Wraps a producer with the configured per-source normalization.
pub struct NormalizedSource<S> {
    inner: S,
    store: Option<String>,
    base_url: Option<String>,
    discount: Option<DiscountFilter>,
    filtered_out: Cell<usize>,
}

impl<S: SnapshotSource> NormalizedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            store: None,
            base_url: None,
            discount: None,
            filtered_out: Cell::new(0),
        }
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_discount(mut self, filter: DiscountFilter) -> Self {
        self.discount = Some(filter);
        self
    }
}

impl<S: SnapshotSource> SnapshotSource for NormalizedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn produce(&self, ctx: &RunContext) -> Result<Vec<Record>> {
        let mut records = self.inner.produce(ctx)?;

        for record in &mut records {
            if let Some(base) = &self.base_url {
                record.identity = absolutize_identity(base, &record.identity);
            }
            if let Some(store) = &self.store {
                stamp_store(record, store);
            }
        }

        let dropped = match &self.discount {
            Some(filter) => filter.apply(&mut records),
            None => 0,
        };
        self.filtered_out.set(dropped);

        Ok(records)
    }

    fn filtered_out(&self) -> usize {
        self.filtered_out.get()
    }
}
