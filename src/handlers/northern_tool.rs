//! Northern Tool: JSON pricing endpoint keyed by the part number in the URL.
//!
//! Order: the pricing endpoint directly, then the same request observed
//! while the product page loads, then the generic tiers on the loaded page,
//! then the renderer.

use super::{PriceHandler, ResolveContext, steps};
use crate::error::{ResolveError, ResolveResult};
use crate::fallback::FallbackChain;
use crate::outcome::ExtractionOutcome;
use crate::price::find_price_value;
use crate::session::ResponseMatcher;
use crate::tiers::GENERIC_TIERS;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub const NORTHERN_TOOL_PRICE_ENDPOINT: &str =
    "https://www.northerntool.com/wcs/resources/store/6970/price";

const PRICE_PROFILE: &str = "IBM_Store_EntitledPrice_RangePrice_All";

const ENDPOINT_HEADERS: &[(&str, &str)] = &[
    ("User-Agent", "Mozilla/5.0"),
    ("Accept", "application/json"),
];

/// Seven digits not followed by another digit
static PART_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{7})(?:\D|$)").expect("BUG: hardcoded part number regex is invalid")
});

/// Part number embedded in a product URL
#[must_use]
pub fn part_number(url: &str) -> Option<&str> {
    PART_NUMBER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone)]
pub struct NorthernToolHandler {
    price_endpoint: String,
}

impl Default for NorthernToolHandler {
    fn default() -> Self {
        Self::with_endpoint(NORTHERN_TOOL_PRICE_ENDPOINT)
    }
}

impl NorthernToolHandler {
    /// Use another base URL for the pricing endpoint
    pub fn with_endpoint(price_endpoint: impl Into<String>) -> Self {
        Self {
            price_endpoint: price_endpoint.into(),
        }
    }

    /// Full pricing request for `part`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn price_url(&self, part: &str) -> Result<String, url::ParseError> {
        let url = Url::parse_with_params(
            &self.price_endpoint,
            &[
                ("q", "byPartNumbers"),
                ("profileName", PRICE_PROFILE),
                ("currency", "USD"),
                ("partNumber", part),
            ],
        )?;
        Ok(url.into())
    }

    async fn endpoint(&self, ctx: &ResolveContext, part: Option<&str>) -> ResolveResult<ExtractionOutcome> {
        let part = part.ok_or_else(|| {
            ResolveError::SelectorMiss("no part number in URL".to_string())
        })?;
        let url = self
            .price_url(part)
            .map_err(|e| ResolveError::Config(format!("bad pricing endpoint: {e}")))?;
        steps::json_endpoint(ctx, &url, ENDPOINT_HEADERS, find_price_value).await
    }
}

#[async_trait]
impl PriceHandler for NorthernToolHandler {
    fn name(&self) -> &'static str {
        "northern_tool"
    }

    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome {
        let task = ctx.task();
        let part = part_number(task.url());
        let matcher = ResponseMatcher::containing(
            ["price", "byPartNumbers"]
                .into_iter()
                .chain(part),
        );
        let use_renderer = task.allows_renderer() && ctx.services().renderer().is_available();

        FallbackChain::new(self.name())
            .step("endpoint", self.endpoint(ctx, part))
            .step(
                "network",
                steps::network_response(ctx, &matcher, find_price_value),
            )
            .step("direct", async {
                // The network step already loaded the page when it took a session
                if ctx.holds_session() {
                    steps::loaded_page(ctx, GENERIC_TIERS, &[]).await
                } else {
                    steps::direct_page(ctx, GENERIC_TIERS, &[]).await
                }
            })
            .step_if(use_renderer, "renderer", steps::renderer(ctx))
            .run()
            .await
    }
}
