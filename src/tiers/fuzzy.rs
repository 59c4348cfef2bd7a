//! Fuzzy scan over visible text.
//!
//! Any recognizable price in the text is accepted, so incidental amounts
//! such as shipping costs can win when nothing better exists on the page.

use crate::price::{CanonicalPrice, normalize};
use scraper::{Html, Node};

const HIDDEN_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

#[must_use]
pub fn scan(document: &Html) -> Option<CanonicalPrice> {
    let nodes = visible_text_nodes(document);
    normalize(&nodes.join(" ")).or_else(|| nodes.iter().find_map(|text| normalize(text)))
}

/// Text nodes in document order, skipping script-like containers
fn visible_text_nodes(document: &Html) -> Vec<&str> {
    document
        .tree
        .nodes()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_PARENTS.contains(&el.name()))
            });
            let trimmed = text.trim();
            (!hidden && !trimmed.is_empty()).then_some(trimmed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_text_is_ignored() {
        let doc = Html::parse_document(
            r#"<script>var promo = "$1.00";</script><p>Only £4.50 today</p>"#,
        );
        assert_eq!(scan(&doc).unwrap().as_str(), "£4.50");
    }

    #[test]
    fn first_in_document_order() {
        let doc = Html::parse_document("<p>Was EUR 20</p><p>Now EUR 15</p>");
        assert_eq!(scan(&doc).unwrap().as_str(), "EUR 20");
    }

    #[test]
    fn nothing_to_find() {
        let doc = Html::parse_document("<p>Contact us</p>");
        assert!(scan(&doc).is_none());
    }
}
