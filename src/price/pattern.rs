//! Price pattern rules and the canonical price type.
//!
//! Rules are tried in a fixed priority order and the first rule that matches
//! anywhere in the input wins:
//!
//! 1. symbol before amount (`$12.99`, `€ 8,50`)
//! 2. amount before code (`3.50 USD`)
//! 3. code before amount (`EUR 1.299,00`)
//!
//! The captured amount only ever contains ASCII digits and the two
//! conventional separators. Either separator is accepted in either role, so
//! `1,299.00` and `1.299,00` both pass through untouched; no locale is assumed
//! and no conversion is attempted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Closed set of currency symbols, longest first so `US$` wins over `$`
const SYMBOLS: &str = r"US\$|C\$|A\$|\$|€|£|¥|₹";

/// Closed set of ISO codes recognized after or before an amount
const CODES: &str = "USD|CAD|AUD|EUR|GBP|JPY|INR|MXN|CHF|CNY";

/// Digits with optional `,`/`.` groups; a trailing separator is never captured
const AMOUNT: &str = r"[0-9]+(?:[.,][0-9]+)*";

static BARE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{AMOUNT}$")).expect("BUG: hardcoded bare amount regex is invalid")
});

/// Where the currency marker sits relative to the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyPosition {
    SymbolBeforeAmount,
    AmountBeforeCode,
    CodeBeforeAmount,
}

/// One matching rule: a shape plus its compiled regex
#[derive(Debug, Clone)]
pub struct PriceRule {
    position: CurrencyPosition,
    regex: Regex,
}

impl PriceRule {
    fn compile(position: CurrencyPosition) -> Self {
        let source = match position {
            CurrencyPosition::SymbolBeforeAmount => {
                format!(r"(?P<cur>{SYMBOLS})\s?(?P<amt>{AMOUNT})")
            }
            CurrencyPosition::AmountBeforeCode => {
                format!(r"(?P<amt>{AMOUNT})\s?(?P<cur>{CODES})\b")
            }
            CurrencyPosition::CodeBeforeAmount => {
                format!(r"\b(?P<cur>{CODES})\s?(?P<amt>{AMOUNT})")
            }
        };
        let regex = Regex::new(&source).expect("BUG: hardcoded price rule regex is invalid");
        Self { position, regex }
    }

    #[must_use]
    pub fn position(&self) -> CurrencyPosition {
        self.position
    }

    fn apply(&self, text: &str) -> Option<CanonicalPrice> {
        let caps = self.regex.captures(text)?;
        let currency = caps.name("cur")?.as_str();
        let amount = caps.name("amt")?.as_str();
        Some(CanonicalPrice::from_parts(self.position, currency, amount))
    }
}

/// Ordered list of price rules; first matching rule wins
#[derive(Debug, Clone)]
pub struct PricePattern {
    rules: Vec<PriceRule>,
}

impl PricePattern {
    /// The standard rule order
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: vec![
                PriceRule::compile(CurrencyPosition::SymbolBeforeAmount),
                PriceRule::compile(CurrencyPosition::AmountBeforeCode),
                PriceRule::compile(CurrencyPosition::CodeBeforeAmount),
            ],
        }
    }

    /// Apply rules in priority order, returning the first rule's match
    #[must_use]
    pub fn first_match(&self, text: &str) -> Option<CanonicalPrice> {
        if text.is_empty() {
            return None;
        }
        self.rules.iter().find_map(|rule| rule.apply(text))
    }
}

/// Process-wide compiled pattern; read-only after first use
pub static PRICE_PATTERN: LazyLock<PricePattern> = LazyLock::new(PricePattern::standard);

/// Whether `s` is nothing but an amount (`19.95`, `1,299`)
pub(crate) fn is_bare_amount(s: &str) -> bool {
    BARE_AMOUNT.is_match(s)
}

/// A normalized price: currency marker plus amount in a recognized shape
///
/// Serialized as its canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CanonicalPrice {
    text: String,
    position: CurrencyPosition,
    currency_len: usize,
}

impl CanonicalPrice {
    fn from_parts(position: CurrencyPosition, currency: &str, amount: &str) -> Self {
        let text = match position {
            CurrencyPosition::SymbolBeforeAmount => format!("{currency}{amount}"),
            CurrencyPosition::AmountBeforeCode => format!("{amount} {currency}"),
            CurrencyPosition::CodeBeforeAmount => format!("{currency} {amount}"),
        };
        Self {
            text,
            position,
            currency_len: currency.len(),
        }
    }

    /// Canonical string form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn position(&self) -> CurrencyPosition {
        self.position
    }

    /// Currency symbol or code
    #[must_use]
    pub fn currency(&self) -> &str {
        match self.position {
            CurrencyPosition::AmountBeforeCode => &self.text[self.text.len() - self.currency_len..],
            _ => &self.text[..self.currency_len],
        }
    }

    /// Numeric amount exactly as captured
    #[must_use]
    pub fn amount(&self) -> &str {
        match self.position {
            CurrencyPosition::SymbolBeforeAmount => &self.text[self.currency_len..],
            CurrencyPosition::AmountBeforeCode => {
                &self.text[..self.text.len() - self.currency_len - 1]
            }
            CurrencyPosition::CodeBeforeAmount => &self.text[self.currency_len + 1..],
        }
    }
}

impl fmt::Display for CanonicalPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<CanonicalPrice> for String {
    fn from(price: CanonicalPrice) -> Self {
        price.text
    }
}

impl TryFrom<String> for CanonicalPrice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match PRICE_PATTERN.first_match(&value) {
            Some(price) if price.text == value => Ok(price),
            _ => Err(format!("not a canonical price: {value:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        PRICE_PATTERN.first_match(s).map(String::from)
    }

    #[test]
    fn symbol_shape_strips_inner_space() {
        assert_eq!(norm("Price: $ 12.99 each").as_deref(), Some("$12.99"));
        assert_eq!(norm("€\u{a0}8,50").as_deref(), Some("€8,50"));
        assert_eq!(norm("US$1,299.00").as_deref(), Some("US$1,299.00"));
    }

    #[test]
    fn code_shapes_keep_single_space() {
        assert_eq!(norm("Shipping: 3.50USD").as_deref(), Some("3.50 USD"));
        assert_eq!(norm("EUR 1.299,00 incl.").as_deref(), Some("EUR 1.299,00"));
    }

    #[test]
    fn symbol_rule_outranks_code_rules_regardless_of_position() {
        assert_eq!(
            norm("Shipping 3.50 USD, item $12.99").as_deref(),
            Some("$12.99")
        );
    }

    #[test]
    fn trailing_sentence_period_is_not_captured() {
        assert_eq!(norm("Only $5.").as_deref(), Some("$5"));
    }

    #[test]
    fn codes_inside_words_are_ignored() {
        assert_eq!(norm("12 USDT"), None);
        assert_eq!(norm("XEUR 5"), None);
    }

    #[test]
    fn malformed_and_empty_input_is_absent() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("$"), None);
        assert_eq!(norm("$.99"), None);
        assert_eq!(norm("no price here"), None);
    }

    #[test]
    fn parts_are_recoverable() {
        let p = PRICE_PATTERN.first_match("about 3.50 USD").unwrap();
        assert_eq!(p.currency(), "USD");
        assert_eq!(p.amount(), "3.50");
        let p = PRICE_PATTERN.first_match("£1,000").unwrap();
        assert_eq!(p.currency(), "£");
        assert_eq!(p.amount(), "1,000");
        let p = PRICE_PATTERN.first_match("CAD 7").unwrap();
        assert_eq!(p.currency(), "CAD");
        assert_eq!(p.amount(), "7");
    }

    #[test]
    fn serde_uses_canonical_string() {
        let p = PRICE_PATTERN.first_match("$12.99").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"$12.99\"");
        let back: CanonicalPrice = serde_json::from_str("\"$12.99\"").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<CanonicalPrice>("\"$ 12.99\"").is_err());
    }
}
