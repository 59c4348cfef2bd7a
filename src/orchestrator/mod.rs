//! Batch scheduling.
//!
//! Each task runs in its own spawned tokio task, at most `concurrency` at a
//! time. A task that panics is caught at the join and recorded as an
//! unhandled exception; the rest of the batch carries on. Results are stored
//! by input position, so the report keeps input order regardless of
//! completion order.

pub mod report;

pub use report::{BatchReport, ErrorRecord, TaskResult};

use crate::config::PriceScrapeConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::handlers::{HandlerRegistry, ResolveContext, ResolveServices};
use crate::outcome::ExtractionOutcome;
use crate::price::normalize;
use crate::session_pool::SessionPool;
use crate::task::Task;
use crate::utils::is_valid_url;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// Where rendering sessions come from
enum PoolSource {
    /// Launch Chromium at batch start, shut it down at batch end
    Launch,
    /// Caller-owned pool; the caller shuts it down
    Provided(SessionPool),
    /// No sessions; steps needing a page fail over to the next fallback
    Disabled,
}

/// Runs batches of tasks against a handler registry
pub struct Orchestrator {
    services: Arc<ResolveServices>,
    registry: Arc<HandlerRegistry>,
    pool: PoolSource,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("services", &self.services)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Production orchestrator: reqwest, configured providers and renderer,
    /// the standard handlers, and a Chromium pool per batch.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if the HTTP client cannot be built.
    pub fn new(config: PriceScrapeConfig) -> ResolveResult<Self> {
        let services = ResolveServices::from_config(Arc::new(config))?;
        Ok(Self::from_services(services))
    }

    /// Orchestrator over caller-built services
    #[must_use]
    pub fn from_services(services: ResolveServices) -> Self {
        Self {
            services: Arc::new(services),
            registry: Arc::new(HandlerRegistry::standard()),
            pool: PoolSource::Launch,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Borrow sessions from `pool` instead of launching a browser
    #[must_use]
    pub fn with_pool(mut self, pool: SessionPool) -> Self {
        self.pool = PoolSource::Provided(pool);
        self
    }

    /// Run without rendering sessions
    #[must_use]
    pub fn without_browser(mut self) -> Self {
        self.pool = PoolSource::Disabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PriceScrapeConfig {
        self.services.config()
    }

    /// Resolve every task and report in input order. Never fails as a whole.
    pub async fn run_batch(&self, tasks: Vec<Task>) -> BatchReport {
        let start = Instant::now();
        let total = tasks.len();
        let concurrency = self.config().concurrency().max(1);
        info!(tasks = total, concurrency, "starting batch");

        let (pool, owned) = self.open_pool(&tasks).await;

        let mut slots: Vec<Option<ExtractionOutcome>> = vec![None; total];
        let mut pending = tasks.iter().cloned().enumerate();
        let mut active = FuturesUnordered::new();

        loop {
            // Fill up to concurrency limit
            while active.len() < concurrency {
                let Some((index, task)) = pending.next() else {
                    break;
                };
                let services = Arc::clone(&self.services);
                let registry = Arc::clone(&self.registry);
                let pool = pool.clone();

                let handle =
                    tokio::spawn(async move { resolve_task(task, services, registry, pool).await });
                active.push(async move { (index, handle.await) });
            }

            match active.next().await {
                Some((index, Ok(outcome))) => {
                    debug!(index, found = outcome.is_found(), "task finished");
                    slots[index] = Some(outcome);
                }
                Some((index, Err(join_error))) => {
                    let detail = panic_detail(join_error);
                    error!(index, "task panicked: {detail}");
                    slots[index] = Some(
                        ExtractionOutcome::miss()
                            .with_failure(&ResolveError::UnhandledException(detail)),
                    );
                }
                None => break,
            }
        }

        if owned
            && let Some(pool) = &pool
            && let Err(e) = pool.shutdown().await
        {
            warn!("Session pool shutdown failed: {e}");
        }

        let results: Vec<(Task, ExtractionOutcome)> = tasks
            .into_iter()
            .zip(slots)
            .map(|(task, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    ExtractionOutcome::miss().with_failure(&ResolveError::UnhandledException(
                        "task produced no outcome".to_string(),
                    ))
                });
                (task, outcome)
            })
            .collect();

        let report = BatchReport::from_results(results);
        info!(
            tasks = total,
            found = report.found_count(),
            errors = report.errors().len(),
            elapsed_ms = start.elapsed().as_millis(),
            "batch complete"
        );
        report
    }

    /// Session pool for this batch and whether this batch owns it
    async fn open_pool(&self, tasks: &[Task]) -> (Option<SessionPool>, bool) {
        match &self.pool {
            PoolSource::Provided(pool) => (Some(pool.clone()), false),
            PoolSource::Disabled => (None, false),
            PoolSource::Launch => {
                if tasks.iter().all(|t| t.url().is_empty()) {
                    return (None, false);
                }
                match SessionPool::launch(self.config()).await {
                    Ok(pool) => (Some(pool), true),
                    Err(e) => {
                        error!("Failed to launch session pool, continuing without pages: {e:#}");
                        (None, false)
                    }
                }
            }
        }
    }
}

/// Resolve one task end to end; always yields exactly one outcome
async fn resolve_task(
    task: Task,
    services: Arc<ResolveServices>,
    registry: Arc<HandlerRegistry>,
    pool: Option<SessionPool>,
) -> ExtractionOutcome {
    if task.url().is_empty() {
        return ExtractionOutcome::miss();
    }
    if !is_valid_url(task.url()) {
        return ExtractionOutcome::miss()
            .with_failure(&ResolveError::ParseError(format!("invalid URL '{}'", task.url())));
    }

    let ctx = ResolveContext::new(task, services, pool);
    let handler = registry.dispatch(ctx.task());
    debug!(url = ctx.task().url(), handler = handler.name(), "resolving");

    let outcome = handler.handle(&ctx).await;
    ctx.finish().await;
    accept(outcome)
}

/// Re-normalize a handler's price; anything not already canonical is dropped
fn accept(outcome: ExtractionOutcome) -> ExtractionOutcome {
    let Some(price) = outcome.price() else {
        return outcome;
    };
    if normalize(price.as_str()).as_ref() == Some(price) {
        return outcome;
    }
    let err = ResolveError::ParseError(format!("rejected non-canonical price '{price}'"));
    warn!("{err}");
    outcome.without_price().with_failure(&err)
}

fn panic_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Tier;

    #[test]
    fn canonical_prices_pass_through() {
        let outcome = ExtractionOutcome::found(normalize("$12.99").unwrap(), Tier::Semantic);
        assert_eq!(accept(outcome.clone()), outcome);
        assert_eq!(accept(ExtractionOutcome::miss()), ExtractionOutcome::miss());
    }

    #[tokio::test]
    async fn panic_message_is_kept() {
        let err = tokio::spawn(async { panic!("handler blew up") })
            .await
            .unwrap_err();
        assert_eq!(panic_detail(err), "handler blew up");
    }
}
