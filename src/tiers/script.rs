//! Embedded script scan: structured data first, then loose assignments

use crate::price::{CanonicalPrice, find_offer_price, normalize_with_currency, normalize_with_default};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static LD_JSON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("BUG: hardcoded CSS selector 'script[type=\"application/ld+json\"]' is invalid")
});

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script").expect("BUG: hardcoded CSS selector 'script' is invalid")
});

/// `"price": 12.99`, `salePrice = '12.99'`, `"offerPrice":"1,299.00"`
static LOOSE_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?[a-z_]*price["']?\s*[:=]\s*["']?([0-9]+(?:[.,][0-9]+)*)"#)
        .expect("BUG: hardcoded loose price regex is invalid")
});

#[must_use]
pub fn scan(document: &Html, default_currency: &str) -> Option<CanonicalPrice> {
    structured_data(document, default_currency).or_else(|| loose_assignments(document, default_currency))
}

/// Price from `application/ld+json` blocks; a declared `priceCurrency`
/// overrides `default_currency`
#[must_use]
pub fn structured_data(document: &Html, default_currency: &str) -> Option<CanonicalPrice> {
    document.select(&LD_JSON_SELECTOR).find_map(|script| {
        let body: String = script.text().collect();
        match serde_json::from_str::<serde_json::Value>(body.trim()) {
            Ok(value) => find_offer_price(&value).and_then(|offer| {
                normalize_with_currency(&offer.amount, offer.currency.as_deref(), default_currency)
            }),
            Err(e) => {
                debug!(error = %e, "skipping malformed JSON-LD block");
                None
            }
        }
    })
}

fn loose_assignments(document: &Html, default_currency: &str) -> Option<CanonicalPrice> {
    document.select(&SCRIPT_SELECTOR).find_map(|script| {
        let body: String = script.text().collect();
        LOOSE_PRICE
            .captures_iter(&body)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| normalize_with_default(m.as_str(), default_currency))
    })
}
