//! Vendor handlers and the registry that dispatches tasks to them.
//!
//! Every handler implements [`PriceHandler`] and describes its resolution as a
//! [`FallbackChain`](crate::fallback::FallbackChain) of shared steps. Handlers
//! never return errors; a chain that finds nothing yields a miss carrying
//! every step's reason.

pub mod context;
pub mod generic;
pub mod grainger;
pub mod harbor_freight;
pub mod menards;
pub mod northern_tool;
pub mod registry;
pub mod steps;

pub use context::{ResolveContext, ResolveServices, SessionLease};
pub use generic::GenericHandler;
pub use grainger::GraingerHandler;
pub use harbor_freight::HarborFreightHandler;
pub use menards::MenardsHandler;
pub use northern_tool::NorthernToolHandler;
pub use registry::HandlerRegistry;

use crate::outcome::ExtractionOutcome;
use async_trait::async_trait;

/// One resolution strategy for a family of URLs
#[async_trait]
pub trait PriceHandler: Send + Sync {
    /// Short name used in logs and error records
    fn name(&self) -> &'static str;

    /// Resolve the context's task. Failures become a priceless outcome.
    async fn handle(&self, ctx: &ResolveContext) -> ExtractionOutcome;
}
