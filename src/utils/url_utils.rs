//! URL helpers for dispatch and validation.

use url::Url;

/// Check if a URL is a fetchable http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// Lowercased host of a URL, independent of scheme, path, or query
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed.host_str().map(|h| h.trim_end_matches('.').to_ascii_lowercase())
}

/// Whether `host` is `suffix` itself or a subdomain of it
///
/// Matches on label boundaries, so `notmenards.com` does not match `menards.com`.
#[must_use]
pub fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    let suffix = suffix.trim_start_matches('.');
    host == suffix
        || (host.len() > suffix.len()
            && host.ends_with(suffix)
            && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_ignores_scheme_path_and_query() {
        assert_eq!(
            host_of("HTTPS://WWW.Menards.com/main/p-1.htm?x=1#frag").as_deref(),
            Some("www.menards.com")
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn suffix_matches_on_label_boundary() {
        assert!(host_matches_suffix("www.menards.com", "menards.com"));
        assert!(host_matches_suffix("menards.com", "menards.com"));
        assert!(!host_matches_suffix("notmenards.com", "menards.com"));
        assert!(!host_matches_suffix("menards.com.evil.io", "menards.com"));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(is_valid_url("https://example.com/a"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url(""));
    }
}
