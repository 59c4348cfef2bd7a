//! The per-task extraction result and its diagnostic labels

use crate::error::ResolveError;
use crate::price::CanonicalPrice;
use crate::utils::safe_truncate_chars;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced (or last attempted) the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Explicit task selector
    Selector,
    /// Vendor-specific container selectors
    SiteSelector,
    Semantic,
    Script,
    Fuzzy,
    /// Dedicated pricing/JSON endpoint
    Endpoint,
    /// Captured network response during page load
    NetworkResponse,
    Renderer,
    None,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selector => "selector",
            Self::SiteSelector => "site_selector",
            Self::Semantic => "semantic",
            Self::Script => "script",
            Self::Fuzzy => "fuzzy",
            Self::Endpoint => "endpoint",
            Self::NetworkResponse => "network_response",
            Self::Renderer => "renderer",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the document or value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Proxy,
    Direct,
    Endpoint,
    Renderer,
    None,
}

impl Source {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Direct => "direct",
            Self::Endpoint => "endpoint",
            Self::Renderer => "renderer",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one task.
///
/// `price` is either a canonical price or absent; failure text lives in
/// `error_detail`, never in `price`. Built once through the consuming
/// `with_*` methods and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    price: Option<CanonicalPrice>,
    tier: Tier,
    source: Source,
    http_status: Option<u16>,
    /// [`ResolveError::kind`] of the failure behind `error_detail`
    #[serde(default)]
    error_kind: Option<String>,
    error_detail: Option<String>,
    html_snippet: Option<String>,
}

impl ExtractionOutcome {
    /// A found price
    #[must_use]
    pub fn found(price: CanonicalPrice, tier: Tier) -> Self {
        Self {
            price: Some(price),
            tier,
            source: Source::None,
            http_status: None,
            error_kind: None,
            error_detail: None,
            html_snippet: None,
        }
    }

    /// No price, tier `none`
    #[must_use]
    pub fn miss() -> Self {
        Self {
            price: None,
            tier: Tier::None,
            source: Source::None,
            http_status: None,
            error_kind: None,
            error_detail: None,
            html_snippet: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Set the status unless one was already recorded
    #[must_use]
    pub fn with_status(mut self, status: Option<u16>) -> Self {
        if self.http_status.is_none() {
            self.http_status = status;
        }
        self
    }

    #[must_use]
    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    /// Record a typed failure: its message as the detail, its kind as the label
    #[must_use]
    pub fn with_failure(mut self, err: &ResolveError) -> Self {
        self.error_kind = Some(err.kind().to_string());
        self.error_detail = Some(err.to_string());
        self
    }

    /// Keep at most `max_chars` characters of `html`, whitespace collapsed
    #[must_use]
    pub fn with_snippet(mut self, html: &str, max_chars: usize) -> Self {
        let collapsed = crate::utils::collapse_whitespace(html);
        if !collapsed.is_empty() {
            self.html_snippet = Some(safe_truncate_chars(&collapsed, max_chars).to_string());
        }
        self
    }

    /// Drop the price, keeping diagnostics
    #[must_use]
    pub(crate) fn without_price(mut self) -> Self {
        self.price = None;
        self.tier = Tier::None;
        self
    }

    #[must_use]
    pub fn price(&self) -> Option<&CanonicalPrice> {
        self.price.as_ref()
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.price.is_some()
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        self.error_kind.as_deref()
    }

    #[must_use]
    pub fn html_snippet(&self) -> Option<&str> {
        self.html_snippet.as_deref()
    }

    /// `source/tier` label for error records
    #[must_use]
    pub fn method(&self) -> String {
        format!("{}/{}", self.source, self.tier)
    }
}
