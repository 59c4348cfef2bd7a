//! Batch results in input order, plus the error list handed to the result sink

use crate::outcome::ExtractionOutcome;
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// One task and what resolving it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: Task,
    pub outcome: ExtractionOutcome,
}

/// A task that ended without a price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub vendor: String,
    pub url: String,
    pub http_status: Option<u16>,
    /// The task's selector, or `semantic/fuzzy` when it had none
    pub selector_or_reason: String,
    /// `source/tier` of the last strategy that ran
    pub method: String,
    /// Failure class, e.g. `all_tiers_exhausted` or `unhandled_exception`
    pub error_kind: String,
    pub error_detail: String,
    pub snippet: String,
}

impl ErrorRecord {
    fn from_result(task: &Task, outcome: &ExtractionOutcome) -> Self {
        Self {
            vendor: task.vendor().to_string(),
            url: task.url().to_string(),
            http_status: outcome.http_status(),
            selector_or_reason: task.selector_label().to_string(),
            method: outcome.method(),
            error_kind: outcome.error_kind().unwrap_or("no_price").to_string(),
            error_detail: outcome
                .error_detail()
                .unwrap_or("no price found")
                .to_string(),
            snippet: outcome.html_snippet().unwrap_or_default().to_string(),
        }
    }
}

/// Everything a batch produced, ordered like its input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    results: Vec<TaskResult>,
    errors: Vec<ErrorRecord>,
}

impl BatchReport {
    /// Build from `(task, outcome)` pairs already in input order.
    ///
    /// Every priceless task with a URL becomes an error record; tasks with
    /// an empty URL are left blank without one.
    #[must_use]
    pub fn from_results(results: Vec<(Task, ExtractionOutcome)>) -> Self {
        let errors = results
            .iter()
            .filter(|(task, outcome)| !outcome.is_found() && !task.url().is_empty())
            .map(|(task, outcome)| ErrorRecord::from_result(task, outcome))
            .collect();
        let results = results
            .into_iter()
            .map(|(task, outcome)| TaskResult { task, outcome })
            .collect();
        Self { results, errors }
    }

    #[must_use]
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Tasks that resolved to a price
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_found()).count()
    }

    /// One cell per task: the canonical price, or empty
    #[must_use]
    pub fn price_cells(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.outcome.price().map_or("", |p| p.as_str()))
            .collect()
    }
}
