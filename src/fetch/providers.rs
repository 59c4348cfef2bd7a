//! Third-party rendering proxy providers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Known rendering proxy services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    ScraperApi,
    ScrapingBee,
    ZenRows,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::ScraperApi, Self::ScrapingBee, Self::ZenRows];

    /// Credential map key (and environment variable) that enables this provider
    #[must_use]
    pub fn credential_key(self) -> &'static str {
        match self {
            Self::ScraperApi => "SCRAPERAPI_KEY",
            Self::ScrapingBee => "SCRAPINGBEE_KEY",
            Self::ZenRows => "ZENROWS_KEY",
        }
    }

    #[must_use]
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::ScraperApi => "https://api.scraperapi.com/",
            Self::ScrapingBee => "https://app.scrapingbee.com/api/v1/",
            Self::ZenRows => "https://api.zenrows.com/v1/",
        }
    }

    fn key_param(self) -> &'static str {
        match self {
            Self::ScraperApi | Self::ScrapingBee => "api_key",
            Self::ZenRows => "apikey",
        }
    }

    fn render_param(self) -> (&'static str, &'static str) {
        match self {
            Self::ScraperApi => ("render", "true"),
            Self::ScrapingBee => ("render_js", "true"),
            Self::ZenRows => ("js_render", "true"),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ScraperApi => "scraperapi",
            Self::ScrapingBee => "scrapingbee",
            Self::ZenRows => "zenrows",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A configured provider: kind, credential and endpoint
#[derive(Clone)]
pub struct Provider {
    kind: ProviderKind,
    api_key: String,
    endpoint: String,
}

// Keeps the credential out of logs
impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Provider {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            endpoint: kind.default_endpoint().to_string(),
        }
    }

    /// Point the provider at a different base URL
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Every provider whose credential is present and non-blank, in a fixed order
    #[must_use]
    pub fn from_credentials(credentials: &BTreeMap<String, String>) -> Vec<Provider> {
        ProviderKind::ALL
            .iter()
            .filter_map(|kind| {
                credentials
                    .get(kind.credential_key())
                    .map(|key| key.trim())
                    .filter(|key| !key.is_empty())
                    .map(|key| Provider::new(*kind, key))
            })
            .collect()
    }

    /// Full request URL for rendering `target`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn request_url(&self, target: &str) -> Result<String, url::ParseError> {
        let (render_key, render_value) = self.kind.render_param();
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                (self.kind.key_param(), self.api_key.as_str()),
                ("url", target),
                (render_key, render_value),
            ],
        )?;
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_non_blank_credentials_enable_providers() {
        let mut creds = BTreeMap::new();
        creds.insert("ZENROWS_KEY".to_string(), "zr".to_string());
        creds.insert("SCRAPERAPI_KEY".to_string(), "  ".to_string());
        creds.insert("UNRELATED".to_string(), "x".to_string());
        let providers = Provider::from_credentials(&creds);
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].kind(), ProviderKind::ZenRows);
    }

    #[test]
    fn request_url_encodes_target() {
        let provider = Provider::new(ProviderKind::ScraperApi, "k1");
        let url = provider
            .request_url("https://www.menards.com/p?a=1&b=2")
            .unwrap();
        assert_eq!(
            url,
            "https://api.scraperapi.com/?api_key=k1&url=https%3A%2F%2Fwww.menards.com%2Fp%3Fa%3D1%26b%3D2&render=true"
        );
    }

    #[test]
    fn debug_hides_key() {
        let provider = Provider::new(ProviderKind::ScrapingBee, "secret-key");
        assert!(!format!("{provider:?}").contains("secret-key"));
    }
}
