//! Common types used across the client

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend product identifier
///
/// The catalogue issues UUID strings; older payloads carry integer ids. Both
/// are normalised to their string form so lookups compare like with like.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ProductId(s),
            RawId::Unsigned(n) => ProductId(n.to_string()),
            RawId::Signed(n) => ProductId(n.to_string()),
        })
    }
}

/// Product listing query parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub q: String,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
            per_page: 12,
        }
    }
}

impl ProductQuery {
    /// Number of pages needed to show `total_items`
    pub fn total_pages(&self, total_items: u64) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        total_items.div_ceil(u64::from(self.per_page)) as u32
    }
}

/// Format an amount with two decimals, e.g. `₹200.00`
pub fn format_price(amount: Decimal, currency_symbol: &str) -> String {
    format!("{}{:.2}", currency_symbol, amount.round_dp(2))
}
