//! Task records consumed by the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stop after the explicit selector; a miss goes straight to the renderer
pub const FLAG_SELECTOR_ONLY: &str = "selector-only";
/// Skip the external fetch service for this task
pub const FLAG_NO_PROXY: &str = "no-proxy";
/// Never invoke the renderer fallback for this task
pub const FLAG_NO_RENDERER: &str = "no-renderer";

const KNOWN_FLAGS: &[&str] = &[FLAG_SELECTOR_ONLY, FLAG_NO_PROXY, FLAG_NO_RENDERER];

/// One product to price. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    vendor: String,
    url: String,
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    flags: BTreeSet<String>,
}

impl Task {
    pub fn new(vendor: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into().trim().to_string(),
            url: url.into().trim().to_string(),
            selector: None,
            flags: BTreeSet::new(),
        }
    }

    /// Build a task from a source row: `(vendor, url, selector, notes)`.
    ///
    /// Blank selectors become `None`. Notes are split on commas and
    /// whitespace; recognized flags are kept (lowercased), other words are
    /// free-form notes and are dropped.
    pub fn from_row(vendor: &str, url: &str, selector: &str, notes: &str) -> Self {
        let selector = selector.trim();
        let mut task = Self::new(vendor, url);
        if !selector.is_empty() {
            task.selector = Some(selector.to_string());
        }
        task.flags = parse_flags(notes);
        task
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        self.selector = (!selector.trim().is_empty()).then_some(selector);
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into().to_ascii_lowercase());
        self
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    #[must_use]
    pub fn selector_only(&self) -> bool {
        self.has_flag(FLAG_SELECTOR_ONLY)
    }

    #[must_use]
    pub fn allows_proxy(&self) -> bool {
        !self.has_flag(FLAG_NO_PROXY)
    }

    #[must_use]
    pub fn allows_renderer(&self) -> bool {
        !self.has_flag(FLAG_NO_RENDERER)
    }

    /// Label for the selector column of an error record
    #[must_use]
    pub fn selector_label(&self) -> &str {
        self.selector.as_deref().unwrap_or("semantic/fuzzy")
    }
}

fn parse_flags(notes: &str) -> BTreeSet<String> {
    notes
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(|word| word.trim().to_ascii_lowercase())
        .filter(|word| KNOWN_FLAGS.contains(&word.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_parsing_trims_and_keeps_known_flags() {
        let task = Task::from_row(
            " Menards ",
            " https://www.menards.com/p-1.htm ",
            "  ",
            "check weekly, Selector-Only no-proxy",
        );
        assert_eq!(task.vendor(), "Menards");
        assert_eq!(task.url(), "https://www.menards.com/p-1.htm");
        assert_eq!(task.selector(), None);
        assert!(task.selector_only());
        assert!(!task.allows_proxy());
        assert!(task.allows_renderer());
        assert_eq!(task.flags().len(), 2);
    }

    #[test]
    fn selector_label_defaults_to_scan_name() {
        let task = Task::new("v", "https://example.com");
        assert_eq!(task.selector_label(), "semantic/fuzzy");
        let task = task.with_selector(".price");
        assert_eq!(task.selector_label(), ".price");
    }
}
