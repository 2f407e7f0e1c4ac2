//! JSON feed files as snapshot sources.

use crate::errors::{serialization_error, Result};
use salewatch_core::errors::{WatchError, WatchErrorKind};
use salewatch_core::{Record, RunContext, SnapshotSource};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads one source's records from a JSON array file.
///
/// Records may use the canonical field names or the legacy scraper names
/// (`url`, `name`, `price_new`, `price_old`).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&self, _ctx: &RunContext) -> Result<Vec<Record>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            WatchError::new(WatchErrorKind::Io)
                .with_op("read_feed")
                .with_source_name(self.name.clone())
                .with_message(format!("cannot read feed {}: {}", self.path.display(), e))
        })?;

        let values: Vec<Value> = serde_json::from_str(&content)
            .map_err(|e| serialization_error("parse_feed", e).with_source_name(self.name.clone()))?;

        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| self.decode(index, value))
            .collect()
    }
}

impl JsonFileSource {
    fn decode(&self, index: usize, value: Value) -> Result<Record> {
        let identity = ["identity", "url"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string);

        serde_json::from_value(value).map_err(|e| {
            let err = WatchError::new(WatchErrorKind::Serialization)
                .with_op("parse_feed")
                .with_source_name(self.name.clone())
                .with_message(format!("record #{}: {}", index, e));
            match identity {
                Some(identity) => err.with_identity(identity),
                None => err,
            }
        })
    }
}
