//! Menards: proxy first, then the page itself

use super::{PriceHandler, ResolveContext, steps};
use crate::fallback::FallbackChain;
use crate::outcome::{ExtractionOutcome, Tier};
use async_trait::async_trait;

/// Price containers, most specific first
pub const MENARDS_SELECTORS: &[&str] = &[
    r#"[data-at-id="full-price-discount-edlp"] span"#,
    r#"[data-at-id="full-price-current-edlp"] span"#,
    r#"meta[property="product:price:amount"]"#,
];

const PROXY_TIERS: &[Tier] = &[Tier::Selector, Tier::SiteSelector, Tier::Script, Tier::Fuzzy];

const DIRECT_TIERS: &[Tier] = &[
    Tier::Selector,
    Tier::SiteSelector,
    Tier::Semantic,
    Tier::Script,
    Tier::Fuzzy,
];

#[derive(Debug, Default, Clone, Copy)]
pub struct MenardsHandler;

#[async_trait]
impl PriceHandler for MenardsHandler {
    fn name(&self) -> &'static str {
        "menards"
    }

    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome {
        let task = ctx.task();
        let use_proxy = task.allows_proxy() && ctx.services().fetcher().is_configured();
        let use_renderer = task.allows_renderer() && ctx.services().renderer().is_available();

        FallbackChain::new(self.name())
            .step_if(use_proxy, "proxy", steps::proxy_page(ctx, PROXY_TIERS, MENARDS_SELECTORS))
            .step("direct", steps::direct_page(ctx, DIRECT_TIERS, MENARDS_SELECTORS))
            .step_if(use_renderer, "renderer", steps::renderer(ctx))
            .run()
            .await
    }
}
