//! Explicit and vendor-specific selector tiers

use super::element_text;
use crate::error::ResolveError;
use crate::price::{CanonicalPrice, normalize, normalize_with_default};
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

/// Price from the first element matching `selector`.
///
/// # Errors
///
/// [`ResolveError::SelectorMiss`] when the selector is invalid, matches
/// nothing, or the matched element holds no price.
pub fn scan(
    document: &Html,
    selector: &str,
    default_currency: &str,
) -> Result<CanonicalPrice, ResolveError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| ResolveError::SelectorMiss(format!("invalid selector '{selector}': {e}")))?;

    let element = document
        .select(&parsed)
        .next()
        .ok_or_else(|| ResolveError::SelectorMiss(format!("'{selector}' matched nothing")))?;

    price_from_element(&element, default_currency)
        .ok_or_else(|| ResolveError::SelectorMiss(format!("no price in '{selector}'")))
}

/// First price found by any of `selectors`, tried in order.
///
/// Every matching element of a selector is checked before the next
/// selector. Invalid selectors are skipped.
#[must_use]
pub fn first_of(document: &Html, selectors: &[&str], default_currency: &str) -> Option<CanonicalPrice> {
    selectors.iter().find_map(|raw| {
        let parsed = Selector::parse(raw).ok()?;
        let found = document
            .select(&parsed)
            .find_map(|el| price_from_element(&el, default_currency));
        if found.is_none() {
            trace!(selector = raw, "site selector found nothing");
        }
        found
    })
}

/// Text first, then a `content` attribute (meta tags, microdata)
pub(crate) fn price_from_element(
    element: &ElementRef<'_>,
    default_currency: &str,
) -> Option<CanonicalPrice> {
    let text = element_text(element);
    if let Some(price) = normalize(&text) {
        return Some(price);
    }
    element
        .value()
        .attr("content")
        .and_then(|content| normalize_with_default(content, default_currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_price_markup_is_joined() {
        let doc = Html::parse_document(
            r#"<div class="pp"><span>$</span><span>1,049</span><sup>.99</sup></div>"#,
        );
        assert_eq!(scan(&doc, ".pp", "$").unwrap().as_str(), "$1,049.99");
    }

    #[test]
    fn invalid_selector_is_a_miss() {
        let doc = Html::parse_document("<p>$1.00</p>");
        let err = scan(&doc, "p[[", "$").unwrap_err();
        assert!(matches!(err, ResolveError::SelectorMiss(_)));
    }

    #[test]
    fn meta_content_uses_default_currency() {
        let doc = Html::parse_document(
            r#"<head><meta property="product:price:amount" content="49.97"></head>"#,
        );
        let found = first_of(
            &doc,
            &["[data-at-id=\"full-price-current-edlp\"] span", "meta[property=\"product:price:amount\"]"],
            "$",
        );
        assert_eq!(found.unwrap().as_str(), "$49.97");
    }
}
