//! Harbor Freight: personalization feed keyed by the product id, then pages

use super::{PriceHandler, ResolveContext, steps};
use crate::error::{ResolveError, ResolveResult};
use crate::fallback::FallbackChain;
use crate::outcome::ExtractionOutcome;
use crate::tiers::GENERIC_TIERS;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

pub const DYNAMIC_YIELD_ENDPOINT: &str = "https://st.dynamicyield.com/spa/json";

const DYNAMIC_YIELD_SECTION: &str = "8772758";

static PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-(\d+)\.html").expect("BUG: hardcoded product id regex is invalid")
});

/// Numeric product id from `...-63552.html`
#[must_use]
pub fn product_id(url: &str) -> Option<&str> {
    PRODUCT_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `feedProperties.price`, as a string or number
#[must_use]
pub fn feed_price(value: &Value) -> Option<String> {
    match value.pointer("/feedProperties/price")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct HarborFreightHandler {
    feed_endpoint: String,
}

impl Default for HarborFreightHandler {
    fn default() -> Self {
        Self::with_endpoint(DYNAMIC_YIELD_ENDPOINT)
    }
}

impl HarborFreightHandler {
    /// Use another base URL for the personalization feed
    pub fn with_endpoint(feed_endpoint: impl Into<String>) -> Self {
        Self {
            feed_endpoint: feed_endpoint.into(),
        }
    }

    /// Feed request for the product at `page_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn feed_url(&self, page_url: &str, product: &str) -> Result<String, url::ParseError> {
        let context = serde_json::json!({"type": "PRODUCT", "data": [product]}).to_string();
        let url = Url::parse_with_params(
            &self.feed_endpoint,
            &[
                ("sec", DYNAMIC_YIELD_SECTION),
                ("ref", page_url),
                ("isSesNew", "false"),
                ("ctx", context.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    async fn feed(&self, ctx: &ResolveContext) -> ResolveResult<ExtractionOutcome> {
        let page_url = ctx.task().url();
        let product = product_id(page_url)
            .ok_or_else(|| ResolveError::SelectorMiss("no product id in URL".to_string()))?;
        let url = self
            .feed_url(page_url, product)
            .map_err(|e| ResolveError::Config(format!("bad feed endpoint: {e}")))?;
        steps::json_endpoint(ctx, &url, &[("Accept", "application/json")], feed_price).await
    }
}

#[async_trait]
impl PriceHandler for HarborFreightHandler {
    fn name(&self) -> &'static str {
        "harbor_freight"
    }

    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome {
        let task = ctx.task();
        let use_proxy = task.allows_proxy() && ctx.services().fetcher().is_configured();
        let use_renderer = task.allows_renderer() && ctx.services().renderer().is_available();

        FallbackChain::new(self.name())
            .step("endpoint", self.feed(ctx))
            .step_if(use_proxy, "proxy", steps::proxy_page(ctx, GENERIC_TIERS, &[]))
            .step("direct", steps::direct_page(ctx, GENERIC_TIERS, &[]))
            .step_if(use_renderer, "renderer", steps::renderer(ctx))
            .run()
            .await
    }
}
