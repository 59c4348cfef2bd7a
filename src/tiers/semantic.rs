//! Semantic scan over price-like attributes and classes

use super::selector::price_from_element;
use crate::price::CanonicalPrice;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Lookup order; first element with a price wins
static SEMANTIC_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"[class*="price"]"#,
        r#"[id*="price"]"#,
        r#"[class*="amount"]"#,
        r#"[itemprop="price"]"#,
        r#"meta[property="product:price:amount"]"#,
    ]
    .iter()
    .map(|s| {
        Selector::parse(s).unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{s}' is invalid: {e}"))
    })
    .collect()
});

#[must_use]
pub fn scan(document: &Html, default_currency: &str) -> Option<CanonicalPrice> {
    SEMANTIC_SELECTORS.iter().find_map(|selector| {
        document
            .select(selector)
            .find_map(|el| price_from_element(&el, default_currency))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_beats_itemprop() {
        let doc = Html::parse_document(
            r#"<span itemprop="price" content="10.00"></span><span class="sale-price">$8.00</span>"#,
        );
        assert_eq!(scan(&doc, "$").unwrap().as_str(), "$8.00");
    }

    #[test]
    fn empty_price_container_is_skipped() {
        let doc = Html::parse_document(
            r#"<div class="price"></div><div id="price-block">£3.10</div>"#,
        );
        assert_eq!(scan(&doc, "$").unwrap().as_str(), "£3.10");
    }

    #[test]
    fn itemprop_content_attribute() {
        let doc = Html::parse_document(r#"<meta itemprop="price" content="1299.00">"#);
        assert_eq!(scan(&doc, "€").unwrap().as_str(), "€1299.00");
    }

    #[test]
    fn nothing_price_like() {
        let doc = Html::parse_document("<p>Hello $5.00</p>");
        assert!(scan(&doc, "$").is_none());
    }
}
