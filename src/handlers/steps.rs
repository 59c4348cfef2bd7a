//! Fallback steps shared by the vendor handlers.
//!
//! Each function is one strategy `(context) -> outcome`. They never decide
//! ordering; handlers stack them into a [`FallbackChain`](crate::fallback::FallbackChain).

use super::context::ResolveContext;
use crate::error::{ResolveError, ResolveResult};
use crate::outcome::{ExtractionOutcome, Source, Tier};
use crate::price::{normalize, normalize_with_default};
use crate::session::ResponseMatcher;
use crate::tiers::{resolve, run_tiers};
use serde_json::Value;
use tracing::{debug, info};

/// Fetch through the proxy providers and run `tiers` on the returned HTML
pub async fn proxy_page(
    ctx: &ResolveContext,
    tiers: &[Tier],
    site_selectors: &[&str],
) -> ResolveResult<ExtractionOutcome> {
    let url = ctx.task().url();
    let Some(page) = ctx.services().fetcher().fetch_rendered(url).await else {
        return Err(ResolveError::ProviderFailure {
            provider: "proxy".to_string(),
            reason: "no provider returned a page".to_string(),
        });
    };
    let outcome = run_tiers(&page.html, tiers, &ctx.tier_options(site_selectors));
    Ok(outcome.with_source(Source::Proxy).with_status(Some(page.status)))
}

/// Load the page in the task's pooled session, wait briefly for a price
/// container, then run `tiers` on the rendered HTML
pub async fn direct_page(
    ctx: &ResolveContext,
    tiers: &[Tier],
    site_selectors: &[&str],
) -> ResolveResult<ExtractionOutcome> {
    let config = ctx.config();
    let url = ctx.task().url();
    let session = ctx.session().await?;

    let status = session.navigate(url, config.navigation_timeout()).await?;
    if !config.settle_delay().is_zero() {
        tokio::time::sleep(config.settle_delay()).await;
    }

    let wait_for: Vec<&str> = ctx
        .task()
        .selector()
        .into_iter()
        .chain(site_selectors.iter().copied())
        .collect();
    if !wait_for.is_empty() {
        let combined = wait_for.join(", ");
        if let Err(e) = session
            .wait_for_selector(&combined, config.selector_timeout())
            .await
        {
            debug!(url, selector = %combined, "price container never appeared: {e}");
        }
    }

    let html = session.content().await?;
    let outcome = run_tiers(&html, tiers, &ctx.tier_options(site_selectors));
    Ok(outcome.with_source(Source::Direct).with_status(status))
}

/// Run `tiers` on whatever the task's session already has loaded
pub async fn loaded_page(
    ctx: &ResolveContext,
    tiers: &[Tier],
    site_selectors: &[&str],
) -> ResolveResult<ExtractionOutcome> {
    let html = ctx.session().await?.content().await?;
    let outcome = run_tiers(&html, tiers, &ctx.tier_options(site_selectors));
    Ok(outcome.with_source(Source::Direct))
}

/// Last resort: ask the out-of-process renderer for the page
pub async fn renderer(ctx: &ResolveContext) -> ResolveResult<ExtractionOutcome> {
    let url = ctx.task().url();
    let output = ctx.services().renderer().render(url).await?;
    let text = output.trim();
    if text.is_empty() {
        return Err(ResolveError::Renderer("renderer produced no output".to_string()));
    }

    let price = if text.starts_with('<') {
        resolve(text, &ctx.tier_options(&[])).price().cloned()
    } else {
        normalize(text)
    };

    let snippet_chars = ctx.config().snippet_chars();
    let outcome = match price {
        Some(price) => {
            info!(url, %price, "renderer fallback produced a price");
            ExtractionOutcome::found(price, Tier::Renderer)
        }
        None => ExtractionOutcome::miss()
            .with_error("no price in renderer output")
            .with_snippet(text, snippet_chars),
    };
    Ok(outcome.with_source(Source::Renderer))
}

/// GET a JSON pricing endpoint and pull a price out with `extract`
pub async fn json_endpoint<F>(
    ctx: &ResolveContext,
    endpoint: &str,
    headers: &[(&str, &str)],
    extract: F,
) -> ResolveResult<ExtractionOutcome>
where
    F: FnOnce(&Value) -> Option<String> + Send,
{
    let config = ctx.config();
    let response = ctx
        .services()
        .http()
        .get(endpoint, headers, config.http_timeout())
        .await?;

    if !response.is_success() {
        return Ok(ExtractionOutcome::miss()
            .with_source(Source::Endpoint)
            .with_status(Some(response.status))
            .with_error(format!("endpoint returned status {}", response.status))
            .with_snippet(&response.body, config.snippet_chars()));
    }

    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| ResolveError::ParseError(format!("endpoint body is not JSON: {e}")))?;

    let outcome = match extract(&value)
        .and_then(|raw| normalize_with_default(&raw, config.default_currency()))
    {
        Some(price) => ExtractionOutcome::found(price, Tier::Endpoint),
        None => ExtractionOutcome::miss()
            .with_error("no price in endpoint response")
            .with_snippet(&response.body, config.snippet_chars()),
    };
    Ok(outcome
        .with_source(Source::Endpoint)
        .with_status(Some(response.status)))
}

/// Load the page while listening for a pricing response matching `matcher`
pub async fn network_response<F>(
    ctx: &ResolveContext,
    matcher: &ResponseMatcher,
    extract: F,
) -> ResolveResult<ExtractionOutcome>
where
    F: FnOnce(&Value) -> Option<String> + Send,
{
    let config = ctx.config();
    let session = ctx.session().await?;
    let captured = session
        .navigate_and_capture(ctx.task().url(), matcher, config.response_timeout())
        .await?;

    let Some(response) = captured else {
        return Ok(ExtractionOutcome::miss()
            .with_source(Source::Direct)
            .with_error("no matching network response"));
    };

    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| ResolveError::ParseError(format!("captured response is not JSON: {e}")))?;

    let outcome = match extract(&value)
        .and_then(|raw| normalize_with_default(&raw, config.default_currency()))
    {
        Some(price) => ExtractionOutcome::found(price, Tier::NetworkResponse),
        None => ExtractionOutcome::miss()
            .with_error(format!("no price in response from {}", response.url))
            .with_snippet(&response.body, config.snippet_chars()),
    };
    Ok(outcome
        .with_source(Source::Direct)
        .with_status(Some(response.status)))
}
