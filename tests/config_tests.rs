//! Configuration builder validation and environment loading

use kodegen_tools_pricescrape::config::{PriceScrapeConfig, PriceScrapeConfigBuilder};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_are_valid() {
    let config = PriceScrapeConfig::default();
    assert_eq!(config.concurrency(), 5);
    assert!(config.headless());
    assert!(config.stealth_mode());
    assert_eq!(config.default_currency(), "$");
    assert!(config.provider_credentials().is_empty());
    assert!(config.renderer_command().is_none());
}

#[test]
fn environment_overrides_defaults() {
    let config = PriceScrapeConfigBuilder::from_lookup(lookup(&[
        ("SCRAPER_CONCURRENCY", " 12 "),
        ("HEADLESS", "no"),
        ("STEALTH_MODE", "Yes"),
        ("ZENROWS_KEY", "zr-key"),
        ("SCRAPINGBEE_KEY", "   "),
        ("PRICESCRAPE_RENDERER", "node fallback-scraper.js"),
    ]))
    .unwrap()
    .build()
    .unwrap();

    assert_eq!(config.concurrency(), 12);
    assert!(!config.headless());
    assert!(config.stealth_mode());
    assert_eq!(
        config.provider_credentials().get("ZENROWS_KEY").map(String::as_str),
        Some("zr-key")
    );
    assert!(!config.provider_credentials().contains_key("SCRAPINGBEE_KEY"));
    assert_eq!(config.renderer_command(), Some("node fallback-scraper.js"));
}

#[test]
fn non_numeric_concurrency_is_rejected() {
    let err = PriceScrapeConfigBuilder::from_lookup(lookup(&[("SCRAPER_CONCURRENCY", "many")]))
        .unwrap_err();
    assert!(err.to_string().contains("SCRAPER_CONCURRENCY"));
}

#[test]
fn concurrency_must_be_in_range() {
    assert!(PriceScrapeConfig::builder().concurrency(0).build().is_err());
    assert!(PriceScrapeConfig::builder().concurrency(65).build().is_err());
    assert!(PriceScrapeConfig::builder().concurrency(64).build().is_ok());
}

#[test]
fn zero_timeouts_are_rejected() {
    let err = PriceScrapeConfig::builder()
        .navigation_timeout(Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("navigation_timeout"));

    // A zero settle delay just skips the pause
    let config = PriceScrapeConfig::builder()
        .settle_delay(Duration::ZERO)
        .build()
        .unwrap();
    assert!(config.settle_delay().is_zero());
}

#[test]
fn unknown_default_currency_is_rejected() {
    assert!(PriceScrapeConfig::builder().default_currency("€").build().is_ok());
    assert!(PriceScrapeConfig::builder().default_currency("Kr").build().is_err());
}

#[test]
fn debug_output_hides_credentials() {
    let config = PriceScrapeConfig::builder()
        .provider_credential("SCRAPERAPI_KEY", "super-secret")
        .build()
        .unwrap();
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("SCRAPERAPI_KEY"));
}
