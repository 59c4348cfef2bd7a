//! Price normalization
//!
//! Turns raw text, attribute values, and JSON scalars into a [`CanonicalPrice`]:
//! a currency marker plus a numeric amount in one of three recognized shapes.
//! Absence of a match is a normal result, never an error.

pub mod json_scan;
pub mod pattern;

pub use json_scan::{JsonPriceScan, OfferPrice, find_offer_price, find_price_value};
pub use pattern::{CanonicalPrice, CurrencyPosition, PRICE_PATTERN, PricePattern, PriceRule};

/// Normalize raw text into a canonical price using the fixed rule order.
///
/// ```
/// use kodegen_tools_pricescrape::price::normalize;
///
/// assert_eq!(normalize("Now only $ 1,299.00!").unwrap().as_str(), "$1,299.00");
/// assert_eq!(normalize("3.50 USD").unwrap().as_str(), "3.50 USD");
/// assert!(normalize("call for pricing").is_none());
/// ```
#[must_use]
pub fn normalize(text: &str) -> Option<CanonicalPrice> {
    PRICE_PATTERN.first_match(text)
}

/// Normalize a value that may be a bare amount, prefixing `default_currency`
/// when the raw value alone carries no currency marker.
///
/// Used for script values and attribute contents such as `19.95`.
#[must_use]
pub fn normalize_with_default(raw: &str, default_currency: &str) -> Option<CanonicalPrice> {
    if let Some(price) = normalize(raw) {
        return Some(price);
    }
    let trimmed = raw.trim();
    if !pattern::is_bare_amount(trimmed) {
        return None;
    }
    normalize(&format!("{default_currency}{trimmed}"))
}

/// ISO codes written as a symbol in canonical prices
const CODE_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("INR", "₹"),
    ("CAD", "C$"),
    ("AUD", "A$"),
];

/// Normalize a bare amount using a declared ISO currency code.
///
/// Codes with a symbol become `symbol+amount`; other recognized codes become
/// `amount CODE`. Unknown or missing codes fall back to `default_currency`.
#[must_use]
pub fn normalize_with_currency(
    raw: &str,
    currency_code: Option<&str>,
    default_currency: &str,
) -> Option<CanonicalPrice> {
    let Some(code) = currency_code.map(|c| c.trim().to_ascii_uppercase()) else {
        return normalize_with_default(raw, default_currency);
    };
    if let Some((_, symbol)) = CODE_SYMBOLS.iter().find(|(c, _)| *c == code) {
        return normalize_with_default(raw, symbol);
    }
    let trimmed = raw.trim();
    if pattern::is_bare_amount(trimmed)
        && let Some(price) = normalize(&format!("{trimmed} {code}"))
    {
        return Some(price);
    }
    normalize_with_default(raw, default_currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bare_amount_gets_default_symbol() {
        assert_eq!(
            normalize_with_default("19.95", "$").unwrap().as_str(),
            "$19.95"
        );
        assert_eq!(
            normalize_with_default(" 19.95 EUR", "$").unwrap().as_str(),
            "19.95 EUR"
        );
    }

    #[test]
    fn declared_currency_replaces_the_default() {
        let price = |raw, code| normalize_with_currency(raw, code, "$").map(|p| p.as_str().to_string());
        assert_eq!(price("19.95", Some("EUR")).as_deref(), Some("€19.95"));
        assert_eq!(price("19.95", Some("usd")).as_deref(), Some("$19.95"));
        assert_eq!(price("19.95", Some("CHF")).as_deref(), Some("19.95 CHF"));
        assert_eq!(price("19.95", Some("XYZ")).as_deref(), Some("$19.95"));
        assert_eq!(price("19.95", None).as_deref(), Some("$19.95"));
        // A marker in the value itself wins
        assert_eq!(price("£4.00", Some("EUR")).as_deref(), Some("£4.00"));
    }

    #[test]
    fn default_is_not_applied_to_non_amounts() {
        assert!(normalize_with_default("2025-12-31", "$").is_none());
        assert!(normalize_with_default("InStock", "$").is_none());
        assert!(normalize_with_default("", "$").is_none());
    }

    fn amount() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..100_000, 0u32..100).prop_map(|(w, c)| format!("{w}.{c:02}")),
            (1u32..1000, 0u32..1000, 0u32..100)
                .prop_map(|(t, h, c)| format!("{t},{h:03}.{c:02}")),
            (1u32..1000, 0u32..1000, 0u32..100)
                .prop_map(|(t, h, c)| format!("{t}.{h:03},{c:02}")),
            (1u32..10_000).prop_map(|w| w.to_string()),
        ]
    }

    fn canonical_token() -> impl Strategy<Value = String> {
        (
            amount(),
            prop::sample::select(vec!["$", "€", "£", "¥", "₹"]),
            prop::sample::select(vec!["USD", "EUR", "GBP", "CAD"]),
            0usize..3,
        )
            .prop_map(|(amt, sym, code, shape)| match shape {
                0 => format!("{sym}{amt}"),
                1 => format!("{amt} {code}"),
                _ => format!("{code} {amt}"),
            })
    }

    proptest! {
        #[test]
        fn single_token_is_returned_unchanged(
            token in canonical_token(),
            prefix in "[a-z :]{0,20}",
            suffix in "[a-z :!]{0,20}",
        ) {
            // Codes are matched case-sensitively, so lowercase filler never forms one.
            let text = format!("{prefix} {token} {suffix}");
            let found = normalize(&text);
            prop_assert_eq!(found.map(|p| p.as_str().to_string()), Some(token));
        }

        #[test]
        fn normalizing_is_idempotent(token in canonical_token()) {
            let once = normalize(&token).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn text_without_digits_never_matches(text in "[^0-9]{0,64}") {
            prop_assert!(normalize(&text).is_none());
        }
    }
}
