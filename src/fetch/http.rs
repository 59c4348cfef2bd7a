//! HTTP collaborator: plain GET with headers and a per-call timeout

use crate::error::{ResolveError, ResolveResult};
use crate::utils::CHROME_USER_AGENT;
use async_trait::async_trait;
use std::time::Duration;

/// Response from a GET request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `get(url, headers, timeout) -> status, body`
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> ResolveResult<HttpResponse>;
}

/// reqwest-backed client with a desktop Chrome user agent
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if the TLS backend cannot initialize.
    pub fn new(default_timeout: Duration) -> ResolveResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(CHROME_USER_AGENT)
            .build()
            .map_err(|e| ResolveError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> ResolveResult<HttpResponse> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| timeout_aware(e, url, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| timeout_aware(e, url, timeout))?;

        tracing::trace!(url, status, bytes = body.len(), "GET complete");
        Ok(HttpResponse { status, body })
    }
}

fn timeout_aware(err: reqwest::Error, url: &str, after: Duration) -> ResolveError {
    if err.is_timeout() {
        ResolveError::Timeout {
            operation: format!("GET {url}"),
            after,
        }
    } else {
        ResolveError::Http(format!("GET {url}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_status_and_body_for_non_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item")
            .match_header("x-test", "1")
            .with_status(404)
            .with_body("gone")
            .create_async()
            .await;

        let client = ReqwestClient::new(Duration::from_secs(5)).unwrap();
        let response = client
            .get(
                &format!("{}/item", server.url()),
                &[("x-test", "1")],
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "gone");
        assert!(!response.is_success());
        mock.assert_async().await;
    }
}
