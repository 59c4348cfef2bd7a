//! Tiered price resolution for product URLs.
//!
//! A batch of [`Task`]s goes through the [`Orchestrator`], which dispatches
//! each one to a vendor handler or the generic tier pipeline, borrows a
//! pooled browser session only when a step needs a rendered page, and
//! returns a [`BatchReport`] in input order.

pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod handlers;
pub mod io;
pub mod orchestrator;
pub mod outcome;
pub mod price;
pub mod renderer;
pub mod session;
pub mod session_pool;
pub mod stealth;
pub mod task;
pub mod tiers;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{PriceScrapeConfig, PriceScrapeConfigBuilder};
pub use error::{ResolveError, ResolveResult};
pub use fallback::FallbackChain;
pub use fetch::{HttpClient, HttpResponse, Provider, ProviderKind, ProxyFetcher, ReqwestClient};
pub use handlers::{HandlerRegistry, PriceHandler, ResolveContext, ResolveServices};
pub use orchestrator::{BatchReport, ErrorRecord, Orchestrator, TaskResult};
pub use outcome::{ExtractionOutcome, Source, Tier};
pub use price::{CanonicalPrice, normalize, normalize_with_default};
pub use renderer::{CommandRenderer, NoopRenderer, RENDERER_CREDENTIALS, Renderer};
pub use session::{CapturedResponse, ChromiumSession, PageSession, ResponseMatcher};
pub use session_pool::{SessionGuard, SessionPool};
pub use task::Task;

/// Run `tasks` with the production collaborators described by `config`
///
/// # Errors
///
/// Returns [`ResolveError::Config`] if the collaborators cannot be built.
/// Individual task failures never surface here; they are in the report.
pub async fn resolve_batch(config: PriceScrapeConfig, tasks: Vec<Task>) -> ResolveResult<BatchReport> {
    let orchestrator = Orchestrator::new(config)?;
    Ok(orchestrator.run_batch(tasks).await)
}
