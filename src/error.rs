//! Error types for price resolution
//!
//! Every variant except [`ResolveError::Config`] is non-fatal: fallback chains
//! convert them into "no price from this step" and move on, and the
//! orchestrator records whatever reaches the task boundary without stopping
//! the batch.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for resolution steps
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Error taxonomy for the resolution path
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Selector matched nothing, or the matched text held no price
    #[error("selector miss: {0}")]
    SelectorMiss(String),

    /// A bounded wait was exceeded
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// A proxy provider returned non-success or an empty body
    #[error("provider {provider} failed: {reason}")]
    ProviderFailure { provider: String, reason: String },

    /// Structured data (JSON, JSON-LD) could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Every strategy in a task's chain produced nothing
    #[error("all tiers exhausted: {0}")]
    AllTiersExhausted(String),

    /// A task's resolution path panicked or its worker was lost
    #[error("unhandled exception: {0}")]
    UnhandledException(String),

    /// Browser/CDP failure (navigation, page creation, closed session)
    #[error("browser error: {0}")]
    Browser(String),

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(String),

    /// Renderer fallback failed to produce output
    #[error("renderer error: {0}")]
    Renderer(String),

    /// Invalid configuration, detected before a batch starts
    #[error("configuration error: {0}")]
    Config(String),
}

impl ResolveError {
    /// Only configuration errors may abort a batch
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Short machine-friendly label, carried into `ErrorRecord::error_kind`
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelectorMiss(_) => "selector_miss",
            Self::Timeout { .. } => "timeout",
            Self::ProviderFailure { .. } => "provider_failure",
            Self::ParseError(_) => "parse_error",
            Self::AllTiersExhausted(_) => "all_tiers_exhausted",
            Self::UnhandledException(_) => "unhandled_exception",
            Self::Browser(_) => "browser",
            Self::Http(_) => "http",
            Self::Renderer(_) => "renderer",
            Self::Config(_) => "config",
        }
    }
}

impl From<anyhow::Error> for ResolveError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Browser(format!("{err:#}"))
    }
}

impl From<chromiumoxide::error::CdpError> for ResolveError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: "http request".to_string(),
                after: Duration::ZERO,
            }
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_is_fatal() {
        assert!(ResolveError::Config("x".into()).is_fatal());
        assert!(!ResolveError::AllTiersExhausted("x".into()).is_fatal());
        assert!(!ResolveError::UnhandledException("x".into()).is_fatal());
        assert!(
            !ResolveError::Timeout {
                operation: "goto".into(),
                after: Duration::from_secs(1)
            }
            .is_fatal()
        );
    }

    #[test]
    fn anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("root cause").context("launching browser");
        let resolved: ResolveError = err.into();
        assert_eq!(
            resolved.to_string(),
            "browser error: launching browser: root cause"
        );
    }
}
