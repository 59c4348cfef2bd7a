//! UTF-8-safe string helpers
//!
//! Snippets stored in outcomes are cut from arbitrary HTML, so truncation must
//! respect character boundaries.

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use kodegen_tools_pricescrape::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("€€€", 2), "€€");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Collapse every whitespace run (including non-breaking spaces) to one space
/// and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(safe_truncate_chars("ab€cd", 3), "ab€");
    }

    #[test]
    fn collapses_nbsp_and_newlines() {
        assert_eq!(collapse_whitespace("  $\u{a0}12.99\n  each "), "$ 12.99 each");
    }
}
