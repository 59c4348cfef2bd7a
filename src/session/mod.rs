//! Rendering session abstraction.
//!
//! A [`PageSession`] is one browser page. The engine only needs navigation,
//! a selector wait, page content and a bounded wait for a matching network
//! response, so that is all this trait offers. Element queries run on the
//! HTML from `content()`. [`ChromiumSession`] is the
//! production implementation; tests substitute in-memory fakes.

pub mod chromium;

pub use chromium::ChromiumSession;

use crate::error::ResolveResult;
use async_trait::async_trait;
use std::time::Duration;

/// Substring predicate over response URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMatcher {
    required: Vec<String>,
}

impl ResponseMatcher {
    /// Match URLs containing every one of `parts`
    pub fn containing<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: parts
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.required.iter().all(|part| url.contains(part.as_str()))
    }
}

/// A network response captured while a page loaded
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// One pooled page. Methods take `&self`; exclusivity comes from the pool.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and return the main document's HTTP status when known
    async fn navigate(&self, url: &str, timeout: Duration) -> ResolveResult<Option<u16>>;

    /// Wait until `selector` matches an element
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ResolveResult<()>;

    /// Current document HTML
    async fn content(&self) -> ResolveResult<String>;

    /// Navigate to `url` while waiting, bounded by `timeout`, for the first
    /// response whose URL satisfies `matcher`.
    ///
    /// Returns `None` when the page finished loading and no such response
    /// arrived within a short grace period after it. A page that is still
    /// loading when `timeout` elapses yields [`ResolveError::Timeout`].
    ///
    /// [`ResolveError::Timeout`]: crate::error::ResolveError::Timeout
    async fn navigate_and_capture(
        &self,
        url: &str,
        matcher: &ResponseMatcher,
        timeout: Duration,
    ) -> ResolveResult<Option<CapturedResponse>>;

    /// Return the page to a blank state between tasks
    async fn reset(&self) -> ResolveResult<()>;

    /// Close the page; called once at pool shutdown
    async fn close(&self) -> ResolveResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_requires_every_part() {
        let m = ResponseMatcher::containing(["price", "byPartNumbers", "4863671"]);
        assert!(m.matches("https://x/wcs/resources/store/6970/price?q=byPartNumbers&partNumber=4863671"));
        assert!(!m.matches("https://x/price?q=byPartNumbers&partNumber=1111111"));
    }

    #[test]
    fn empty_parts_are_ignored() {
        let m = ResponseMatcher::containing(["price", ""]);
        assert!(m.matches("/price"));
    }
}
