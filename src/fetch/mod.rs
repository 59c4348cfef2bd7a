//! External fetch service: rendered HTML through third-party proxies.
//!
//! Providers are shuffled on every call and each is tried at most once. The
//! first success status with a non-empty body wins. Zero configured
//! providers means zero attempts, which is not an error.

pub mod http;
pub mod providers;

pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use providers::{Provider, ProviderKind};

use crate::error::ResolveError;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Body returned by a provider
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub provider: ProviderKind,
    pub status: u16,
    pub html: String,
}

/// Proxy fetcher over a static provider list
#[derive(Clone)]
pub struct ProxyFetcher {
    providers: Vec<Provider>,
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl std::fmt::Debug for ProxyFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyFetcher")
            .field("providers", &self.providers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ProxyFetcher {
    pub fn new(providers: Vec<Provider>, http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            providers,
            http,
            timeout,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Try providers in random order; `None` when every one failed or none exist
    pub async fn fetch_rendered(&self, url: &str) -> Option<RenderedPage> {
        if self.providers.is_empty() {
            debug!(url, "no proxy providers configured");
            return None;
        }

        let mut order: Vec<&Provider> = self.providers.iter().collect();
        order.shuffle(&mut rand::rng());

        for provider in order {
            match self.try_provider(provider, url).await {
                Ok(page) => {
                    info!(provider = %provider.kind(), url, "proxy fetch succeeded");
                    return Some(page);
                }
                Err(err) => {
                    warn!(provider = %provider.kind(), url, error = %err, "proxy provider failed");
                }
            }
        }

        warn!(url, attempts = self.providers.len(), "all proxy providers failed");
        None
    }

    async fn try_provider(&self, provider: &Provider, url: &str) -> Result<RenderedPage, ResolveError> {
        let failure = |reason: String| ResolveError::ProviderFailure {
            provider: provider.kind().to_string(),
            reason,
        };

        let request_url = provider
            .request_url(url)
            .map_err(|e| failure(format!("bad endpoint: {e}")))?;
        let response = self.http.get(&request_url, &[], self.timeout).await?;

        if !response.is_success() {
            return Err(failure(format!("status {}", response.status)));
        }
        if response.body.trim().is_empty() {
            return Err(failure("empty body".to_string()));
        }

        Ok(RenderedPage {
            provider: provider.kind(),
            status: response.status,
            html: response.body,
        })
    }
}
