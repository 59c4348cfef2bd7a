//! Handler for any URL without a vendor entry

use super::{PriceHandler, ResolveContext, steps};
use crate::fallback::FallbackChain;
use crate::outcome::ExtractionOutcome;
use crate::tiers::GENERIC_TIERS;
use async_trait::async_trait;

/// Direct page with the generic tiers, then proxy, then renderer.
///
/// With `selector-only`, a selector miss on the direct page skips the proxy
/// and goes straight to the renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericHandler;

#[async_trait]
impl PriceHandler for GenericHandler {
    fn name(&self) -> &'static str {
        "generic"
    }

    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome {
        let task = ctx.task();
        let use_proxy = task.allows_proxy()
            && !task.selector_only()
            && ctx.services().fetcher().is_configured();
        let use_renderer = task.allows_renderer() && ctx.services().renderer().is_available();

        FallbackChain::new(self.name())
            .step("direct", steps::direct_page(ctx, GENERIC_TIERS, &[]))
            .step_if(use_proxy, "proxy", steps::proxy_page(ctx, GENERIC_TIERS, &[]))
            .step_if(use_renderer, "renderer", steps::renderer(ctx))
            .run()
            .await
    }
}
