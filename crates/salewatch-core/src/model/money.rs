//! Exact decimal money values.
//!
//! Prices are compared by exact decimal value, never through a binary float.
//! Serialized form is a JSON string that keeps the scale (`"10.00"`).

use crate::errors::SaleWatchError;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A monetary amount in the listing's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price from listing display text.
    ///
    /// The text must contain exactly one number; currency symbols, codes,
    /// words and whitespace around it are ignored. Text carrying two numbers
    /// ("Was $40 Now $29", "$10 - $20") is rejected rather than guessed at.
    /// When both `,` and `.` appear, the last one is the decimal separator. A
    /// lone `,` followed by exactly two digits is a decimal comma; otherwise
    /// `,` groups thousands.
    ///
    /// ```
    /// use salewatch_core::Money;
    ///
    /// assert_eq!(Money::parse("$1,299.00").unwrap().to_string(), "1299.00");
    /// assert_eq!(Money::parse("12,99 TL").unwrap().to_string(), "12.99");
    /// assert!(Money::parse("Sold out").is_err());
    /// assert!(Money::parse("Was $40 Now $29").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, SaleWatchError> {
        let invalid = || SaleWatchError::InvalidPrice {
            text: text.to_string(),
        };

        let mut numbers = text
            .split(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .map(|run| run.trim_end_matches(['.', ',']))
            .filter(|run| run.chars().any(|c| c.is_ascii_digit()));
        let kept = numbers.next().ok_or_else(invalid)?;
        if numbers.next().is_some() {
            return Err(invalid());
        }

        let normalized = match (kept.rfind(','), kept.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => kept.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => kept.replace(',', ""),
            (Some(comma), None) => {
                let decimals = kept.len() - comma - 1;
                if kept.matches(',').count() == 1 && decimals == 2 {
                    kept.replace(',', ".")
                } else {
                    kept.replace(',', "")
                }
            }
            (None, _) => kept.to_string(),
        };

        Decimal::from_str(&normalized)
            .map(Money)
            .map_err(|_| invalid())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Money {
    type Err = SaleWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a price string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // Shortest round-trip text of the float, so 12.99 stays 12.99.
        let text = v.to_string();
        Decimal::from_str(&text)
            .map(Money)
            .map_err(|_| E::custom(SaleWatchError::InvalidPrice { text }))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
