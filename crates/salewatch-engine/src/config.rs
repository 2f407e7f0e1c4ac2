//! Watch configuration (`salewatch.toml`).

use rust_decimal::Decimal;
use salewatch_core::errors::{Result, SaleWatchError, WatchError, WatchErrorKind};
use salewatch_core::extract::{compose_source_name, DiscountFilter, NormalizedSource};
use salewatch_core::logging_facility::Profile;
use salewatch_core::{Money, SnapshotSource, StalePolicy};
use salewatch_store::{JsonFileSource, SnapshotStore};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "salewatch.toml";

/// One retailer category to watch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    pub store: String,
    pub category: String,
    /// JSON feed of this category's current listings
    pub feed: PathBuf,
    /// Base for resolving relative listing links
    #[serde(default)]
    pub base_url: Option<String>,
    /// Only listings at least this many percent off are kept
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub min_percent_off: Option<Decimal>,
}

impl SourceSpec {
    pub fn source_name(&self) -> String {
        compose_source_name(&self.store, &self.category)
    }

    /// Build the producer for this source
    pub fn build(&self) -> NormalizedSource<JsonFileSource> {
        let mut source = NormalizedSource::new(JsonFileSource::new(
            self.source_name(),
            self.feed.clone(),
        ))
        .with_store(self.store.trim());
        if let Some(base_url) = &self.base_url {
            source = source.with_base_url(base_url.clone());
        }
        if let Some(min) = self.min_percent_off {
            source = source.with_discount(DiscountFilter::new(min));
        }
        source
    }
}

fn deserialize_percent<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Money>::deserialize(deserializer)?.map(|m| m.amount()))
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".salewatch/snapshot.json")
}

/// Parsed and validated configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub lock_path: Option<PathBuf>,
    #[serde(default)]
    pub stale_policy: StalePolicy,
    #[serde(default)]
    pub log_profile: Profile,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

fn invalid(reason: impl Into<String>) -> WatchError {
    WatchError::from(SaleWatchError::InvalidConfig {
        reason: reason.into(),
    })
}

impl WatchConfig {
    /// Read, parse, resolve and validate a config file.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::NotFound`: the file does not exist
    /// - `WatchErrorKind::Io`: the file cannot be read
    /// - `WatchErrorKind::InvalidConfig`: TOML or validation failure
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                WatchErrorKind::NotFound
            } else {
                WatchErrorKind::Io
            };
            WatchError::new(kind)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&text).map_err(|e| e.with_op("load_config"))?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Parse and validate config text without touching the filesystem.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::InvalidConfig`: TOML or validation failure
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// - `WatchErrorKind::InvalidConfig`: no sources, blank fields, an
    ///   out-of-range discount, or two sources sharing a name
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(invalid("at least one [[sources]] entry is required"));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(invalid("store_path cannot be empty"));
        }

        let mut seen = HashSet::new();
        for spec in &self.sources {
            if spec.store.trim().is_empty() || spec.category.trim().is_empty() {
                return Err(invalid("every source needs a non-empty store and category"));
            }
            let name = spec.source_name();
            if spec.feed.as_os_str().is_empty() {
                return Err(invalid(format!("source {} has an empty feed path", name)));
            }
            if let Some(min) = spec.min_percent_off {
                if min < Decimal::ZERO || min > Decimal::from(100) {
                    return Err(invalid(format!(
                        "source {}: min_percent_off {} is outside 0..=100",
                        name, min
                    )));
                }
            }
            if !seen.insert(name.clone()) {
                return Err(SaleWatchError::DuplicateSource { source_name: name }.into());
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };
        self.store_path = resolve(&self.store_path);
        self.lock_path = self.lock_path.as_deref().map(resolve);
        for spec in &mut self.sources {
            spec.feed = resolve(&spec.feed);
        }
    }

    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.store_path.clone())
    }

    /// Lock file path; defaults to `<store file>.lock` next to the store
    pub fn effective_lock_path(&self) -> PathBuf {
        match &self.lock_path {
            Some(path) => path.clone(),
            None => {
                let mut name = self
                    .store_path
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_default();
                name.push(".lock");
                self.store_path.with_file_name(name)
            }
        }
    }

    /// Producers for every configured source, in config order
    pub fn build_sources(&self) -> Vec<Box<dyn SnapshotSource>> {
        self.sources
            .iter()
            .map(|spec| Box::new(spec.build()) as Box<dyn SnapshotSource>)
            .collect()
    }
}
