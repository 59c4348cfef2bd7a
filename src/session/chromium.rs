//! `PageSession` over a chromiumoxide page

use super::{CapturedResponse, PageSession, ResponseMatcher};
use crate::error::{ResolveError, ResolveResult};
use crate::utils::{CAPTURE_GRACE, SELECTOR_POLL_INTERVAL, with_timeout};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams, ResourceType,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// How long to look for the document response after `goto` returns
const STATUS_GRACE: Duration = Duration::from_millis(250);

/// One Chromium tab
#[derive(Debug, Clone)]
pub struct ChromiumSession {
    id: usize,
    page: Page,
}

impl ChromiumSession {
    pub fn new(id: usize, page: Page) -> Self {
        Self { id, page }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> ResolveResult<Option<u16>> {
        let mut events = self.page.event_listener::<EventResponseReceived>().await?;

        with_timeout(
            async {
                self.page.goto(url).await?;
                Ok(())
            },
            timeout,
            "page navigation",
        )
        .await?;

        // Responses are buffered in the stream; the document's usually arrived already
        let status = tokio::time::timeout(STATUS_GRACE, async {
            while let Some(event) = events.next().await {
                if event.r#type == ResourceType::Document {
                    return u16::try_from(event.response.status).ok();
                }
            }
            None
        })
        .await
        .ok()
        .flatten();

        debug!(session = self.id, url, ?status, "navigated");
        Ok(status)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ResolveResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ResolveError::Timeout {
                    operation: format!("wait for selector '{selector}'"),
                    after: timeout,
                });
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> ResolveResult<String> {
        Ok(self.page.content().await?)
    }

    async fn navigate_and_capture(
        &self,
        url: &str,
        matcher: &ResponseMatcher,
        timeout: Duration,
    ) -> ResolveResult<Option<CapturedResponse>> {
        let mut events = self.page.event_listener::<EventResponseReceived>().await?;

        let matched = with_timeout(
            async {
                let wait_for_match = async {
                    while let Some(event) = events.next().await {
                        trace!(url = %event.response.url, "response received");
                        if matcher.matches(&event.response.url) {
                            return Some(event);
                        }
                    }
                    None
                };
                let navigation = self.page.goto(url);
                let grace = tokio::time::sleep(timeout);
                tokio::pin!(wait_for_match, navigation, grace);

                let mut navigated = false;
                loop {
                    tokio::select! {
                        found = &mut wait_for_match => return Ok(found),
                        result = &mut navigation, if !navigated => {
                            navigated = true;
                            grace.as_mut().reset(Instant::now() + CAPTURE_GRACE);
                            if let Err(e) = result {
                                debug!(session = self.id, url, error = %e, "navigation failed while capturing");
                            }
                        }
                        () = &mut grace, if navigated => {
                            debug!(session = self.id, url, "page loaded without a matching response");
                            return Ok(None);
                        }
                    }
                }
            },
            timeout,
            "matching network response",
        )
        .await?;

        let Some(event) = matched else {
            return Ok(None);
        };

        let body = self
            .page
            .execute(GetResponseBodyParams::new(event.request_id.clone()))
            .await?;
        let text = if body.base64_encoded {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(body.body.as_bytes())
                .map_err(|e| ResolveError::ParseError(format!("response body base64: {e}")))?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            body.body.clone()
        };

        Ok(Some(CapturedResponse {
            url: event.response.url.clone(),
            status: u16::try_from(event.response.status).unwrap_or_default(),
            body: text,
        }))
    }

    async fn reset(&self) -> ResolveResult<()> {
        self.page.goto("about:blank").await?;
        Ok(())
    }

    async fn close(&self) -> ResolveResult<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
