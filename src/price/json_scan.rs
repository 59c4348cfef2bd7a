//! Bounded price discovery over untyped JSON.
//!
//! Vendor pricing endpoints and structured-data blocks nest the price at
//! unpredictable depths. The scan walks a [`serde_json::Value`] breadth-first
//! with a hard node budget and depth cap, so pathological input always
//! terminates.

use crate::utils::{JSON_SCAN_MAX_DEPTH, JSON_SCAN_NODE_BUDGET};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Keys checked first at every object level, in order
const PRIORITY_KEYS: &[&str] = &["salePrice", "offerPrice", "unitPrice", "price", "value"];

/// Substrings that disqualify a key even when it mentions "price"
const EXCLUDED_KEY_PARTS: &[&str] = &["currency", "valid", "date", "count", "type"];

/// Breadth-first visitor with explicit limits
#[derive(Debug, Clone, Copy)]
pub struct JsonPriceScan {
    node_budget: usize,
    max_depth: usize,
}

impl Default for JsonPriceScan {
    fn default() -> Self {
        Self {
            node_budget: JSON_SCAN_NODE_BUDGET,
            max_depth: JSON_SCAN_MAX_DEPTH,
        }
    }
}

impl JsonPriceScan {
    #[must_use]
    pub fn new(node_budget: usize, max_depth: usize) -> Self {
        Self {
            node_budget,
            max_depth,
        }
    }

    /// Return the first numeric-looking price value, as its raw string.
    ///
    /// At each object, priority keys are tried before any other key whose
    /// name contains "price". Shallower matches win over deeper ones.
    #[must_use]
    pub fn find(&self, root: &Value) -> Option<String> {
        self.find_in(root).map(|(amount, _)| amount)
    }

    /// Like [`find`](Self::find), plus the `priceCurrency` declared beside
    /// the price (schema.org offers)
    #[must_use]
    pub fn find_offer(&self, root: &Value) -> Option<OfferPrice> {
        self.find_in(root).map(|(amount, owner)| OfferPrice {
            amount,
            currency: owner
                .get("priceCurrency")
                .and_then(Value::as_str)
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
        })
    }

    fn find_in<'v>(&self, root: &'v Value) -> Option<(String, &'v Map<String, Value>)> {
        let mut queue: VecDeque<(&Value, usize)> = VecDeque::new();
        queue.push_back((root, 0));
        let mut visited = 0usize;

        while let Some((node, depth)) = queue.pop_front() {
            visited += 1;
            if visited > self.node_budget {
                tracing::debug!(budget = self.node_budget, "JSON price scan budget exhausted");
                return None;
            }

            match node {
                Value::Object(map) => {
                    if let Some(found) = price_in_object(map) {
                        return Some((found, map));
                    }
                    if depth < self.max_depth {
                        queue.extend(map.values().map(|child| (child, depth + 1)));
                    }
                }
                Value::Array(items) => {
                    if depth < self.max_depth {
                        queue.extend(items.iter().map(|child| (child, depth + 1)));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// A raw price value and the currency code declared next to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferPrice {
    pub amount: String,
    pub currency: Option<String>,
}

/// Scan with the default limits
#[must_use]
pub fn find_price_value(root: &Value) -> Option<String> {
    JsonPriceScan::default().find(root)
}

/// [`JsonPriceScan::find_offer`] with the default limits
#[must_use]
pub fn find_offer_price(root: &Value) -> Option<OfferPrice> {
    JsonPriceScan::default().find_offer(root)
}

fn price_in_object(map: &Map<String, Value>) -> Option<String> {
    for key in PRIORITY_KEYS {
        if let Some(value) = map.get(*key)
            && let Some(found) = price_scalar(value)
        {
            return Some(found);
        }
    }

    map.iter()
        .filter(|(key, _)| is_price_key(key))
        .find_map(|(_, value)| price_scalar(value))
}

fn is_price_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower.contains("price") && !EXCLUDED_KEY_PARTS.iter().any(|part| lower.contains(part))
}

/// A scalar price, or an object wrapping one under `value`/`amount`
fn price_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let trimmed = s.trim();
            looks_numeric(trimmed).then(|| trimmed.to_string())
        }
        Value::Object(inner) => ["value", "amount"]
            .iter()
            .filter_map(|k| inner.get(*k))
            .find_map(|v| match v {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) if looks_numeric(s.trim()) => Some(s.trim().to_string()),
                _ => None,
            }),
        _ => None,
    }
}

/// Contains a digit and nothing beyond price-like characters
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()
                || matches!(c, '.' | ',' | ' ' | '$' | '€' | '£' | '¥' | '₹')
        })
}
