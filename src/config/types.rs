//! Core configuration type for a pricing batch

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration passed to the orchestrator at construction.
///
/// Built through [`PriceScrapeConfig::builder`] or
/// [`PriceScrapeConfig::from_env`]; read through the getters.
#[derive(Clone, Serialize, Deserialize)]
pub struct PriceScrapeConfig {
    /// Concurrency budget: pooled sessions and in-flight tasks.
    /// Range: 1..=`MAX_CONCURRENCY`
    pub(crate) concurrency: usize,
    pub(crate) headless: bool,
    pub(crate) stealth_mode: bool,

    /// Credential name -> value, e.g. `SCRAPERAPI_KEY`.
    /// Providers are enabled by credential presence.
    pub(crate) provider_credentials: BTreeMap<String, String>,

    /// Override base URLs for providers (provider name -> endpoint)
    pub(crate) provider_endpoints: BTreeMap<String, String>,

    pub(crate) navigation_timeout_ms: u64,
    pub(crate) settle_delay_ms: u64,
    pub(crate) selector_timeout_ms: u64,
    /// Bounded wait for a matching network response during navigation
    pub(crate) response_timeout_ms: u64,
    pub(crate) provider_timeout_ms: u64,
    /// Direct JSON endpoint requests
    pub(crate) http_timeout_ms: u64,
    pub(crate) renderer_timeout_ms: u64,

    /// Characters of document kept for diagnostics
    pub(crate) snippet_chars: usize,
    /// Prefixed to bare amounts from scripts and attributes
    pub(crate) default_currency: String,
    /// External renderer command line; the URL is appended as the last argument
    pub(crate) renderer_command: Option<String>,
}

// Credentials stay out of logs
impl std::fmt::Debug for PriceScrapeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceScrapeConfig")
            .field("concurrency", &self.concurrency)
            .field("headless", &self.headless)
            .field("stealth_mode", &self.stealth_mode)
            .field(
                "provider_credentials",
                &self.provider_credentials.keys().collect::<Vec<_>>(),
            )
            .field("provider_endpoints", &self.provider_endpoints)
            .field("navigation_timeout_ms", &self.navigation_timeout_ms)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("selector_timeout_ms", &self.selector_timeout_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("provider_timeout_ms", &self.provider_timeout_ms)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("renderer_timeout_ms", &self.renderer_timeout_ms)
            .field("snippet_chars", &self.snippet_chars)
            .field("default_currency", &self.default_currency)
            .field("renderer_command", &self.renderer_command)
            .finish()
    }
}
