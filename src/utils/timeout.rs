//! Timeout utilities for network and page operations
//!
//! Every bounded wait in the engine goes through [`with_timeout`] so that an
//! elapsed deadline always surfaces as [`ResolveError::Timeout`], which the
//! fallback chains treat as "no result from this step".

use std::future::Future;
use std::time::Duration;

use crate::error::ResolveError;

/// Wrap an async operation with an explicit deadline
///
/// # Arguments
/// * `operation` - The future to execute
/// * `limit` - Maximum time the operation may take
/// * `operation_name` - Human-readable name used in the timeout error
pub async fn with_timeout<F, T>(
    operation: F,
    limit: Duration,
    operation_name: &str,
) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, ResolveError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(ResolveError::Timeout {
            operation: operation_name.to_string(),
            after: limit,
        }),
    }
}
