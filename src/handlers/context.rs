//! Per-task resolution context and the services shared across a batch

use crate::config::PriceScrapeConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::fetch::{HttpClient, Provider, ProxyFetcher, ReqwestClient};
use crate::renderer::{CommandRenderer, NoopRenderer, RENDERER_CREDENTIALS, Renderer};
use crate::session::PageSession;
use crate::session_pool::{SessionGuard, SessionPool};
use crate::task::Task;
use crate::tiers::TierOptions;
use crate::utils::with_timeout;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

// =============================================================================
// Batch-wide services
// =============================================================================

/// Read-only collaborators handed to every task
pub struct ResolveServices {
    config: Arc<PriceScrapeConfig>,
    fetcher: ProxyFetcher,
    renderer: Arc<dyn Renderer>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ResolveServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveServices")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .field("renderer_available", &self.renderer.is_available())
            .finish_non_exhaustive()
    }
}

impl ResolveServices {
    pub fn new(
        config: Arc<PriceScrapeConfig>,
        fetcher: ProxyFetcher,
        renderer: Arc<dyn Renderer>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            fetcher,
            renderer,
            http,
        }
    }

    /// Build the production collaborators described by `config`.
    ///
    /// Providers come from the configured credentials (with any endpoint
    /// overrides), the renderer from `renderer_command`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: Arc<PriceScrapeConfig>) -> ResolveResult<Self> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(config.http_timeout())?);
        let renderer = renderer_from_config(&config);
        Ok(Self::with_collaborators(config, http, renderer))
    }

    /// Same provider setup as [`ResolveServices::from_config`], over the given
    /// HTTP client and renderer
    pub fn with_collaborators(
        config: Arc<PriceScrapeConfig>,
        http: Arc<dyn HttpClient>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let providers: Vec<Provider> = Provider::from_credentials(config.provider_credentials())
            .into_iter()
            .map(|provider| match config.provider_endpoint(provider.kind().name()) {
                Some(endpoint) => provider.with_endpoint(endpoint),
                None => provider,
            })
            .collect();
        info!(
            providers = providers.len(),
            renderer = renderer.is_available(),
            "resolution services ready"
        );
        let fetcher = ProxyFetcher::new(providers, Arc::clone(&http), config.provider_timeout());
        Self::new(config, fetcher, renderer, http)
    }

    #[must_use]
    pub fn config(&self) -> &PriceScrapeConfig {
        &self.config
    }

    #[must_use]
    pub fn fetcher(&self) -> &ProxyFetcher {
        &self.fetcher
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    #[must_use]
    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }
}

fn renderer_from_config(config: &PriceScrapeConfig) -> Arc<dyn Renderer> {
    let command = config
        .renderer_command()
        .and_then(|line| CommandRenderer::from_command_line(line, config.renderer_timeout()))
        .map(|renderer| {
            renderer.with_env(
                config
                    .provider_credentials()
                    .iter()
                    .filter(|(name, _)| RENDERER_CREDENTIALS.contains(&name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone())),
            )
        });
    match command {
        Some(renderer) => Arc::new(renderer) as Arc<dyn Renderer>,
        None => Arc::new(NoopRenderer),
    }
}

// =============================================================================
// Lazy session lease
// =============================================================================

/// A pooled session acquired on first use and held until the task ends.
///
/// Tasks whose handler only talks to JSON endpoints never touch the pool.
pub struct SessionLease {
    pool: Option<SessionPool>,
    guard: OnceCell<SessionGuard>,
}

impl SessionLease {
    #[must_use]
    pub fn new(pool: Option<SessionPool>) -> Self {
        Self {
            pool,
            guard: OnceCell::new(),
        }
    }

    /// The task's session, acquiring one on the first call
    ///
    /// # Errors
    ///
    /// [`ResolveError::Browser`] when no pool is attached or it is shut down.
    pub async fn session(&self) -> ResolveResult<&dyn PageSession> {
        let Some(pool) = &self.pool else {
            return Err(ResolveError::Browser("no rendering sessions available".to_string()));
        };
        let guard = self.guard.get_or_try_init(|| pool.acquire()).await?;
        Ok(&**guard)
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.guard.initialized()
    }

    /// Blank the page and hand the session back to the pool
    pub async fn release(self, timeout: std::time::Duration) {
        if let Some(guard) = self.guard.into_inner() {
            if let Err(e) = with_timeout(guard.reset(), timeout, "session reset").await {
                debug!("Session reset failed: {e}");
            }
            drop(guard);
        }
    }
}

// =============================================================================
// Per-task context
// =============================================================================

/// Everything a handler needs to resolve one task
pub struct ResolveContext {
    task: Task,
    services: Arc<ResolveServices>,
    lease: SessionLease,
}

impl ResolveContext {
    pub fn new(task: Task, services: Arc<ResolveServices>, pool: Option<SessionPool>) -> Self {
        Self {
            task,
            services,
            lease: SessionLease::new(pool),
        }
    }

    #[must_use]
    pub fn task(&self) -> &Task {
        &self.task
    }

    #[must_use]
    pub fn config(&self) -> &PriceScrapeConfig {
        self.services.config()
    }

    #[must_use]
    pub fn services(&self) -> &ResolveServices {
        &self.services
    }

    /// Pooled session for this task, acquired lazily
    ///
    /// # Errors
    ///
    /// See [`SessionLease::session`].
    pub async fn session(&self) -> ResolveResult<&dyn PageSession> {
        self.lease.session().await
    }

    #[must_use]
    pub fn holds_session(&self) -> bool {
        self.lease.is_held()
    }

    /// Tier inputs for this task with the given vendor selectors
    #[must_use]
    pub fn tier_options<'a>(&'a self, site_selectors: &'a [&'a str]) -> TierOptions<'a> {
        TierOptions {
            selector: self.task.selector(),
            selector_only: self.task.selector_only(),
            site_selectors,
            default_currency: self.config().default_currency(),
            snippet_chars: self.config().snippet_chars(),
        }
    }

    /// Release the session, if one was taken
    pub async fn finish(self) {
        let timeout = self.config().navigation_timeout();
        self.lease.release(timeout).await;
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renderer_receives_configured_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("render.sh");
        std::fs::write(
            &script,
            "printf 'token=[%s] browser=[%s] url=%s' \
             \"$BRIGHTDATA_API_TOKEN\" \"$BRIGHTDATA_BROWSER_URL\" \"$1\"\n",
        )
        .unwrap();

        let config = PriceScrapeConfig::builder()
            .provider_credential("BRIGHTDATA_API_TOKEN", "tok-123")
            .provider_credential("BRIGHTDATA_BROWSER_URL", "wss://brd.test:9222")
            .renderer_command(format!("sh {}", script.display()))
            .build()
            .unwrap();
        let services = ResolveServices::from_config(Arc::new(config)).unwrap();

        let text = services.renderer().render("https://x.test/p").await.unwrap();
        assert_eq!(
            text,
            "token=[tok-123] browser=[wss://brd.test:9222] url=https://x.test/p"
        );
    }

    #[tokio::test]
    async fn no_command_means_no_renderer() {
        let config = PriceScrapeConfig::builder()
            .provider_credential("BRIGHTDATA_API_TOKEN", "tok-123")
            .build()
            .unwrap();
        let services = ResolveServices::from_config(Arc::new(config)).unwrap();
        assert!(!services.renderer().is_available());
    }
}
