//! Grainger: structured offer data first, then price-classed text

use super::{PriceHandler, ResolveContext, steps};
use crate::fallback::FallbackChain;
use crate::outcome::{ExtractionOutcome, Tier};
use async_trait::async_trait;

pub const GRAINGER_SELECTORS: &[&str] = &[r#"[class*="price"]"#];

const PROXY_TIERS: &[Tier] = &[Tier::Selector, Tier::Script, Tier::SiteSelector, Tier::Fuzzy];

const DIRECT_TIERS: &[Tier] = &[
    Tier::Selector,
    Tier::Script,
    Tier::SiteSelector,
    Tier::Semantic,
    Tier::Fuzzy,
];

#[derive(Debug, Default, Clone, Copy)]
pub struct GraingerHandler;

#[async_trait]
impl PriceHandler for GraingerHandler {
    fn name(&self) -> &'static str {
        "grainger"
    }

    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome {
        let task = ctx.task();
        let use_proxy = task.allows_proxy() && ctx.services().fetcher().is_configured();
        let use_renderer = task.allows_renderer() && ctx.services().renderer().is_available();

        FallbackChain::new(self.name())
            .step_if(use_proxy, "proxy", steps::proxy_page(ctx, PROXY_TIERS, GRAINGER_SELECTORS))
            .step("direct", steps::direct_page(ctx, DIRECT_TIERS, GRAINGER_SELECTORS))
            .step_if(use_renderer, "renderer", steps::renderer(ctx))
            .run()
            .await
    }
}
