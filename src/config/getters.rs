//! Getter methods for `PriceScrapeConfig`

use std::collections::BTreeMap;
use std::time::Duration;

use super::types::PriceScrapeConfig;

impl PriceScrapeConfig {
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn stealth_mode(&self) -> bool {
        self.stealth_mode
    }

    #[must_use]
    pub fn provider_credentials(&self) -> &BTreeMap<String, String> {
        &self.provider_credentials
    }

    #[must_use]
    pub fn provider_endpoint(&self, provider: &str) -> Option<&str> {
        self.provider_endpoints.get(provider).map(String::as_str)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Pause after navigation for client-side rendering
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    #[must_use]
    pub fn renderer_timeout(&self) -> Duration {
        Duration::from_millis(self.renderer_timeout_ms)
    }

    #[must_use]
    pub fn snippet_chars(&self) -> usize {
        self.snippet_chars
    }

    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    #[must_use]
    pub fn renderer_command(&self) -> Option<&str> {
        self.renderer_command.as_deref()
    }
}

impl Default for PriceScrapeConfig {
    fn default() -> Self {
        // The default builder always passes validation
        Self::builder().build().unwrap_or_else(|e| panic!("BUG: default config is invalid: {e}"))
    }
}
