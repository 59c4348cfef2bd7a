//! Shared fakes for the integration tests: in-memory page sessions, a canned
//! renderer, and fast configuration.
#![allow(dead_code)]

use async_trait::async_trait;
use kodegen_tools_pricescrape::config::PriceScrapeConfigBuilder;
use kodegen_tools_pricescrape::error::{ResolveError, ResolveResult};
use kodegen_tools_pricescrape::session::{CapturedResponse, PageSession, ResponseMatcher};
use kodegen_tools_pricescrape::{
    NoopRenderer, PriceScrapeConfig, Renderer, ReqwestClient, ResolveServices, SessionPool,
};
use parking_lot::Mutex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

// =============================================================================
// Site fixture
// =============================================================================

/// Canned pages and network responses, keyed by page URL
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, (u16, String)>,
    captures: HashMap<String, CapturedResponse>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, status: u16, html: &str) -> Self {
        self.pages.insert(url.to_string(), (status, html.to_string()));
        self
    }

    /// A JSON response observed while `page_url` loads
    pub fn capture(mut self, page_url: &str, response_url: &str, body: &str) -> Self {
        self.captures.insert(
            page_url.to_string(),
            CapturedResponse {
                url: response_url.to_string(),
                status: 200,
                body: body.to_string(),
            },
        );
        self
    }
}

// =============================================================================
// Fake session
// =============================================================================

/// Counters shared by every session of one fake pool
#[derive(Debug, Default)]
pub struct SessionStats {
    pub navigations: AtomicUsize,
    /// Times a session was entered while another task was inside it
    pub overlaps: AtomicUsize,
    pub resets: AtomicUsize,
    closes: Mutex<Vec<usize>>,
}

impl SessionStats {
    pub fn close_counts(&self) -> Vec<usize> {
        self.closes.lock().clone()
    }
}

pub struct FakeSession {
    id: usize,
    site: Arc<FakeSite>,
    stats: Arc<SessionStats>,
    /// Simulated page load time
    load_time: Duration,
    busy: AtomicBool,
    current: Mutex<String>,
}

impl FakeSession {
    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.stats.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    fn load(&self, url: &str) -> Option<u16> {
        let (status, html) = self
            .site
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, "<html><body>Not found</body></html>".to_string()));
        *self.current.lock() = html;
        Some(status)
    }

    fn select_text(&self, selector: &str) -> Option<String> {
        let parsed = Selector::parse(selector).ok()?;
        let html = self.current.lock().clone();
        let document = Html::parse_document(&html);
        document
            .select(&parsed)
            .next()
            .map(|el| el.text().collect::<String>())
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str, _timeout: Duration) -> ResolveResult<Option<u16>> {
        self.enter();
        self.stats.navigations.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_time).await;
        let status = self.load(url);
        self.leave();
        Ok(status)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ResolveResult<()> {
        match self.select_text(selector) {
            Some(_) => Ok(()),
            None => Err(ResolveError::Timeout {
                operation: format!("wait for selector '{selector}'"),
                after: timeout,
            }),
        }
    }

    async fn content(&self) -> ResolveResult<String> {
        Ok(self.current.lock().clone())
    }

    async fn navigate_and_capture(
        &self,
        url: &str,
        matcher: &ResponseMatcher,
        timeout: Duration,
    ) -> ResolveResult<Option<CapturedResponse>> {
        self.navigate(url, timeout).await?;
        Ok(self
            .site
            .captures
            .get(url)
            .filter(|captured| matcher.matches(&captured.url))
            .cloned())
    }

    async fn reset(&self) -> ResolveResult<()> {
        self.stats.resets.fetch_add(1, Ordering::SeqCst);
        *self.current.lock() = String::new();
        Ok(())
    }

    async fn close(&self) -> ResolveResult<()> {
        self.stats.closes.lock()[self.id] += 1;
        Ok(())
    }
}

/// Pool of `size` fake sessions over `site`
pub fn fake_pool(size: usize, site: FakeSite, load_time: Duration) -> (SessionPool, Arc<SessionStats>) {
    let site = Arc::new(site);
    let stats = Arc::new(SessionStats {
        closes: Mutex::new(vec![0; size]),
        ..SessionStats::default()
    });
    let sessions: Vec<Box<dyn PageSession>> = (0..size)
        .map(|id| {
            Box::new(FakeSession {
                id,
                site: Arc::clone(&site),
                stats: Arc::clone(&stats),
                load_time,
                busy: AtomicBool::new(false),
                current: Mutex::new(String::new()),
            }) as Box<dyn PageSession>
        })
        .collect();
    (SessionPool::from_sessions(sessions), stats)
}

// =============================================================================
// Renderer and configuration
// =============================================================================

/// Renderer returning fixed text and counting calls
pub struct CannedRenderer {
    pub text: String,
    pub calls: AtomicUsize,
}

impl CannedRenderer {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Renderer for CannedRenderer {
    async fn render(&self, _url: &str) -> ResolveResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Builder with no settle delay and short timeouts
pub fn fast_config() -> PriceScrapeConfigBuilder {
    PriceScrapeConfig::builder()
        .concurrency(2)
        .settle_delay(Duration::ZERO)
        .navigation_timeout(Duration::from_secs(2))
        .selector_timeout(Duration::from_millis(50))
        .response_timeout(Duration::from_millis(200))
        .http_timeout(Duration::from_secs(2))
        .provider_timeout(Duration::from_secs(2))
}

/// Services over reqwest and the given renderer
pub fn services(config: PriceScrapeConfig, renderer: Option<Arc<dyn Renderer>>) -> ResolveServices {
    let http = Arc::new(ReqwestClient::new(config.http_timeout()).expect("http client"));
    let renderer: Arc<dyn Renderer> = match renderer {
        Some(renderer) => renderer,
        None => Arc::new(NoopRenderer),
    };
    ResolveServices::with_collaborators(Arc::new(config), http, renderer)
}
