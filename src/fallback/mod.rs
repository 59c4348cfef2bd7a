//! First-success-wins runner shared by every handler.
//!
//! A chain is an ordered list of labelled steps. Each step is a future that
//! yields an [`ExtractionOutcome`] or a [`ResolveError`]; steps are only
//! polled when every earlier step came back without a price. Errors never
//! escape the chain: they are logged, folded into the final diagnostic, and
//! the next step runs.

use crate::error::{ResolveError, ResolveResult};
use crate::outcome::ExtractionOutcome;
use futures::future::BoxFuture;
use std::future::Future;
use tracing::debug;

/// Boxed step future
pub type StepFuture<'a> = BoxFuture<'a, ResolveResult<ExtractionOutcome>>;

struct Step<'a> {
    label: &'static str,
    run: StepFuture<'a>,
}

/// Ordered fallback steps for one task
pub struct FallbackChain<'a> {
    name: String,
    steps: Vec<Step<'a>>,
}

impl<'a> FallbackChain<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step. The future is not polled until its turn.
    #[must_use]
    pub fn step<F>(mut self, label: &'static str, fut: F) -> Self
    where
        F: Future<Output = ResolveResult<ExtractionOutcome>> + Send + 'a,
    {
        self.push(label, fut);
        self
    }

    /// Append a step only when `enabled`
    #[must_use]
    pub fn step_if<F>(mut self, enabled: bool, label: &'static str, fut: F) -> Self
    where
        F: Future<Output = ResolveResult<ExtractionOutcome>> + Send + 'a,
    {
        if enabled {
            self.push(label, fut);
        }
        self
    }

    pub fn push<F>(&mut self, label: &'static str, fut: F)
    where
        F: Future<Output = ResolveResult<ExtractionOutcome>> + Send + 'a,
    {
        self.steps.push(Step {
            label,
            run: Box::pin(fut),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run steps in order and return the first outcome carrying a price.
    ///
    /// When nothing succeeds the result has no price, an
    /// `AllTiersExhausted` detail listing every step's reason, and the
    /// first HTTP status and last snippet seen along the way.
    pub async fn run(self) -> ExtractionOutcome {
        let mut reasons: Vec<String> = Vec::with_capacity(self.steps.len());
        let mut status: Option<u16> = None;
        let mut snippet: Option<String> = None;

        for step in self.steps {
            match step.run.await {
                Ok(outcome) if outcome.is_found() => {
                    debug!(
                        chain = %self.name,
                        step = step.label,
                        tier = %outcome.tier(),
                        "fallback step produced a price"
                    );
                    return outcome.with_status(status);
                }
                Ok(outcome) => {
                    let reason = outcome.error_detail().unwrap_or("no price").to_string();
                    debug!(chain = %self.name, step = step.label, %reason, "fallback step missed");
                    status = status.or(outcome.http_status());
                    if let Some(s) = outcome.html_snippet() {
                        snippet = Some(s.to_string());
                    }
                    reasons.push(format!("{}: {reason}", step.label));
                }
                Err(err) => {
                    debug!(chain = %self.name, step = step.label, error = %err, "fallback step failed");
                    reasons.push(format!("{}: {err}", step.label));
                }
            }
        }

        let detail = if reasons.is_empty() {
            "no strategies available".to_string()
        } else {
            reasons.join("; ")
        };
        let mut outcome = ExtractionOutcome::miss()
            .with_status(status)
            .with_failure(&ResolveError::AllTiersExhausted(detail));
        if let Some(s) = snippet {
            // Already bounded by the step that produced it
            outcome = outcome.with_snippet(&s, usize::MAX);
        }
        outcome
    }
}
