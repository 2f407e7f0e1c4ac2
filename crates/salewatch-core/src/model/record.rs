//! Listing records produced by extraction.

use crate::errors::SaleWatchError;
use crate::model::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute key stamped with the retailer name by composite sources.
pub const ATTR_STORE: &str = "store";

/// Attribute key holding list-price text that could not be read as money.
pub const ATTR_LIST_PRICE_TEXT: &str = "list_price_text";

/// One listing as seen by one run.
///
/// `identity` is the sole equality/lookup key across runs; every other field
/// is data about the listing at that point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct Record {
    pub identity: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_list_price: Option<Money>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Record {
    pub fn new(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            current_price: None,
            previous_list_price: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_list_price(mut self, price: Money) -> Self {
        self.previous_list_price = Some(price);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Percentage off the list price, rounded to two decimal places.
    ///
    /// `None` when either price is missing or the list price is not positive.
    pub fn percent_off(&self) -> Option<Decimal> {
        let new = self.current_price?.amount();
        let old = self.previous_list_price?.amount();
        if old <= Decimal::ZERO {
            return None;
        }
        Some(((old - new) / old * Decimal::from(100)).round_dp(2))
    }

    /// Check the fields a record needs to take part in reconciliation.
    pub fn validate(&self, source_name: &str) -> Result<(), SaleWatchError> {
        if self.identity.trim().is_empty() {
            return Err(SaleWatchError::EmptyIdentity {
                source_name: source_name.to_string(),
            });
        }
        Ok(())
    }
}

/// Wire shape accepted on input.
///
/// Accepts the canonical field names and the legacy scraper output
/// (`url`, `name`, `price_new`, `price_old`, plus loose top-level extras such
/// as `store`, which are folded into `attributes`). Canonical names win when
/// both spellings are present.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    identity: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    current_price: Option<Value>,
    #[serde(default)]
    price_new: Option<Value>,
    #[serde(default)]
    previous_list_price: Option<Value>,
    #[serde(default)]
    price_old: Option<Value>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn optional_money(field: &str, value: Option<Value>) -> Result<Option<Money>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => serde_json::from_value::<Money>(v)
            .map(Some)
            .map_err(|e| format!("{}: {}", field, e)),
    }
}

/// The list price is informational, so unreadable text becomes an absent
/// price and the text is kept as an attribute.
fn lenient_list_price(
    identity: &str,
    value: Option<Value>,
    attributes: &mut BTreeMap<String, String>,
) -> Option<Money> {
    let text = match &value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    match optional_money("previous_list_price", value) {
        Ok(price) => price,
        Err(reason) => {
            tracing::warn!(identity, list_price = %text, %reason, "ignoring unreadable list price");
            attributes.entry(ATTR_LIST_PRICE_TEXT.to_string()).or_insert(text);
            None
        }
    }
}

impl TryFrom<RawRecord> for Record {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let identity = raw
            .identity
            .or(raw.url)
            .ok_or_else(|| "record has neither `identity` nor `url`".to_string())?;

        let mut attributes = raw.attributes;
        for (key, value) in raw.extra {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            attributes.entry(key).or_insert(text);
        }

        let current_price = optional_money("current_price", raw.current_price.or(raw.price_new))
            .map_err(|reason| format!("record {}: {}", identity, reason))?;
        let previous_list_price = lenient_list_price(
            &identity,
            raw.previous_list_price.or(raw.price_old),
            &mut attributes,
        );

        Ok(Self {
            identity,
            display_name: raw.display_name.or(raw.name).unwrap_or_default(),
            current_price,
            previous_list_price,
            attributes,
        })
    }
}
