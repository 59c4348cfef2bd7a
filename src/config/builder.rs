//! Builder and environment loading for `PriceScrapeConfig`

use crate::utils::{
    DEFAULT_CONCURRENCY, DEFAULT_CURRENCY, DEFAULT_HTTP_TIMEOUT, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_PROVIDER_TIMEOUT, DEFAULT_RENDERER_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT,
    DEFAULT_SELECTOR_TIMEOUT, DEFAULT_SETTLE_DELAY, DEFAULT_SNIPPET_CHARS, MAX_CONCURRENCY,
};
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::time::Duration;

use super::types::PriceScrapeConfig;

/// Environment variables holding provider credentials
pub const CREDENTIAL_VARS: &[&str] = &[
    "SCRAPERAPI_KEY",
    "SCRAPINGBEE_KEY",
    "ZENROWS_KEY",
    "BRIGHTDATA_BROWSER_URL",
    "BRIGHTDATA_API_TOKEN",
];

#[derive(Debug, Clone)]
pub struct PriceScrapeConfigBuilder {
    concurrency: usize,
    headless: bool,
    stealth_mode: bool,
    provider_credentials: BTreeMap<String, String>,
    provider_endpoints: BTreeMap<String, String>,
    navigation_timeout: Duration,
    settle_delay: Duration,
    selector_timeout: Duration,
    response_timeout: Duration,
    provider_timeout: Duration,
    http_timeout: Duration,
    renderer_timeout: Duration,
    snippet_chars: usize,
    default_currency: String,
    renderer_command: Option<String>,
}

impl Default for PriceScrapeConfigBuilder {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            headless: true,
            stealth_mode: true,
            provider_credentials: BTreeMap::new(),
            provider_endpoints: BTreeMap::new(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            selector_timeout: DEFAULT_SELECTOR_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            renderer_timeout: DEFAULT_RENDERER_TIMEOUT,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            default_currency: DEFAULT_CURRENCY.to_string(),
            renderer_command: None,
        }
    }
}

impl PriceScrapeConfig {
    #[must_use]
    pub fn builder() -> PriceScrapeConfigBuilder {
        PriceScrapeConfigBuilder::default()
    }

    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        PriceScrapeConfigBuilder::from_lookup(|name| std::env::var(name).ok())?.build()
    }
}

impl PriceScrapeConfigBuilder {
    /// Seed a builder from a variable lookup.
    ///
    /// Recognized: `SCRAPER_CONCURRENCY`, `HEADLESS`, `STEALTH_MODE`,
    /// `PRICESCRAPE_RENDERER`, and the credentials in [`CREDENTIAL_VARS`].
    ///
    /// # Errors
    ///
    /// Returns an error when `SCRAPER_CONCURRENCY` is not an integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(raw) = lookup("SCRAPER_CONCURRENCY") {
            let Ok(n) = raw.trim().parse::<usize>() else {
                bail!("SCRAPER_CONCURRENCY must be an integer, got '{raw}'");
            };
            builder.concurrency = n;
        }
        if let Some(raw) = lookup("HEADLESS") {
            builder.headless = parse_flag(&raw);
        }
        if let Some(raw) = lookup("STEALTH_MODE") {
            builder.stealth_mode = parse_flag(&raw);
        }
        for var in CREDENTIAL_VARS {
            if let Some(value) = lookup(var)
                && !value.trim().is_empty()
            {
                builder
                    .provider_credentials
                    .insert((*var).to_string(), value.trim().to_string());
            }
        }
        builder.renderer_command = lookup("PRICESCRAPE_RENDERER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(builder)
    }

    #[must_use]
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn stealth_mode(mut self, enabled: bool) -> Self {
        self.stealth_mode = enabled;
        self
    }

    #[must_use]
    pub fn provider_credential(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.provider_credentials.insert(name.into(), value.into());
        self
    }

    /// Point a provider (by name, e.g. `zenrows`) at another base URL
    #[must_use]
    pub fn provider_endpoint(mut self, provider: impl Into<String>, url: impl Into<String>) -> Self {
        self.provider_endpoints.insert(provider.into(), url.into());
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn selector_timeout(mut self, timeout: Duration) -> Self {
        self.selector_timeout = timeout;
        self
    }

    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    #[must_use]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    #[must_use]
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    #[must_use]
    pub fn renderer_timeout(mut self, timeout: Duration) -> Self {
        self.renderer_timeout = timeout;
        self
    }

    #[must_use]
    pub fn snippet_chars(mut self, chars: usize) -> Self {
        self.snippet_chars = chars;
        self
    }

    #[must_use]
    pub fn default_currency(mut self, symbol: impl Into<String>) -> Self {
        self.default_currency = symbol.into();
        self
    }

    #[must_use]
    pub fn renderer_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        self.renderer_command = (!command.trim().is_empty()).then_some(command);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// Returns an error for a concurrency outside `1..=MAX_CONCURRENCY`, a
    /// zero timeout, a zero snippet length, or a default currency the price
    /// normalizer would not recognize.
    pub fn build(self) -> Result<PriceScrapeConfig> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            bail!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            );
        }

        for (name, value) in [
            ("navigation_timeout", self.navigation_timeout),
            ("selector_timeout", self.selector_timeout),
            ("response_timeout", self.response_timeout),
            ("provider_timeout", self.provider_timeout),
            ("http_timeout", self.http_timeout),
            ("renderer_timeout", self.renderer_timeout),
        ] {
            if value.is_zero() {
                bail!("{name} must be greater than zero");
            }
        }

        if self.snippet_chars == 0 {
            bail!("snippet_chars must be greater than zero");
        }
        if crate::price::normalize(&format!("{}1", self.default_currency)).is_none() {
            bail!(
                "default_currency '{}' is not a recognized currency symbol",
                self.default_currency
            );
        }

        Ok(PriceScrapeConfig {
            concurrency: self.concurrency,
            headless: self.headless,
            stealth_mode: self.stealth_mode,
            provider_credentials: self.provider_credentials,
            provider_endpoints: self.provider_endpoints,
            navigation_timeout_ms: millis(self.navigation_timeout),
            settle_delay_ms: millis(self.settle_delay),
            selector_timeout_ms: millis(self.selector_timeout),
            response_timeout_ms: millis(self.response_timeout),
            provider_timeout_ms: millis(self.provider_timeout),
            http_timeout_ms: millis(self.http_timeout),
            renderer_timeout_ms: millis(self.renderer_timeout),
            snippet_chars: self.snippet_chars,
            default_currency: self.default_currency,
            renderer_command: self.renderer_command,
        })
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// `1`, `true`, `yes`, `y` (any case) are true; everything else is false
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
