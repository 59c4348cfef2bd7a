//! Domain-suffix dispatch table

use super::{
    GenericHandler, GraingerHandler, HarborFreightHandler, MenardsHandler, NorthernToolHandler,
    PriceHandler,
};
use crate::task::Task;
use crate::utils::{host_matches_suffix, host_of};
use std::sync::Arc;
use tracing::trace;

/// Maps registrable domain suffixes to handlers; anything unmatched goes to
/// the generic handler. Built once, read-only afterwards.
pub struct HandlerRegistry {
    entries: Vec<(String, Arc<dyn PriceHandler>)>,
    generic: Arc<dyn PriceHandler>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("domains", &self.domains().collect::<Vec<_>>())
            .field("generic", &self.generic.name())
            .finish()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl HandlerRegistry {
    /// No vendor handlers; everything goes to `generic`
    pub fn new(generic: Arc<dyn PriceHandler>) -> Self {
        Self {
            entries: Vec::new(),
            generic,
        }
    }

    /// The built-in vendor handlers over [`GenericHandler`]
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Arc::new(GenericHandler))
            .with("northerntool.com", Arc::new(NorthernToolHandler::default()))
            .with("harborfreight.com", Arc::new(HarborFreightHandler::default()))
            .with("menards.com", Arc::new(MenardsHandler))
            .with("grainger.com", Arc::new(GraingerHandler))
    }

    /// Register `handler` for `suffix`, replacing any previous entry for it
    #[must_use]
    pub fn with(mut self, suffix: &str, handler: Arc<dyn PriceHandler>) -> Self {
        self.register(suffix, handler);
        self
    }

    pub fn register(&mut self, suffix: &str, handler: Arc<dyn PriceHandler>) {
        let suffix = suffix.trim().trim_start_matches('.').to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != suffix);
        self.entries.push((suffix, handler));
    }

    /// Registered suffixes, in registration order
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(suffix, _)| suffix.as_str())
    }

    /// Vendor handler for `url` by longest matching suffix, if any
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<&dyn PriceHandler> {
        let host = host_of(url)?;
        self.entries
            .iter()
            .filter(|(suffix, _)| host_matches_suffix(&host, suffix))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, handler)| handler.as_ref())
    }

    /// Handler for `task`: its vendor handler, or the generic one
    #[must_use]
    pub fn dispatch(&self, task: &Task) -> &dyn PriceHandler {
        let handler = self
            .lookup(task.url())
            .unwrap_or_else(|| self.generic.as_ref());
        trace!(url = task.url(), handler = handler.name(), "dispatched");
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ResolveContext;
    use crate::outcome::ExtractionOutcome;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl PriceHandler for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn handle(&self, _ctx: &ResolveContext) -> ExtractionOutcome {
            ExtractionOutcome::miss()
        }
    }

    fn name_for(registry: &HandlerRegistry, url: &str) -> &'static str {
        registry.dispatch(&Task::new("v", url)).name()
    }

    #[test]
    fn standard_table_routes_vendors() {
        let registry = HandlerRegistry::standard();
        assert_eq!(
            name_for(&registry, "https://www.northerntool.com/shop/tools/product_200734959"),
            "northern_tool"
        );
        assert_eq!(
            name_for(&registry, "http://www.harborfreight.com/4-in-vise-63552.html"),
            "harbor_freight"
        );
        assert_eq!(name_for(&registry, "https://www.menards.com/main/p-1.htm"), "menards");
        assert_eq!(name_for(&registry, "https://www.grainger.com/product/X"), "grainger");
        assert_eq!(name_for(&registry, "https://example.com/item"), "generic");
    }

    #[test]
    fn dispatch_ignores_scheme_path_and_query() {
        let registry = HandlerRegistry::standard();
        assert_eq!(
            name_for(&registry, "HTTP://MENARDS.COM/x?ref=grainger.com"),
            "menards"
        );
        assert_eq!(name_for(&registry, "https://notmenards.com/p"), "generic");
        assert_eq!(name_for(&registry, "not a url"), "generic");
    }

    #[test]
    fn longest_suffix_wins() {
        let registry = HandlerRegistry::new(Arc::new(Named("fallback")))
            .with("example.com", Arc::new(Named("broad")))
            .with("shop.example.com", Arc::new(Named("narrow")));
        assert_eq!(name_for(&registry, "https://eu.shop.example.com/p"), "narrow");
        assert_eq!(name_for(&registry, "https://blog.example.com/p"), "broad");
        assert_eq!(name_for(&registry, "https://example.org/p"), "fallback");
    }

    #[test]
    fn re_registering_replaces() {
        let registry = HandlerRegistry::new(Arc::new(Named("fallback")))
            .with("example.com", Arc::new(Named("first")))
            .with(".Example.com", Arc::new(Named("second")));
        assert_eq!(registry.domains().count(), 1);
        assert_eq!(name_for(&registry, "https://example.com"), "second");
    }
}
