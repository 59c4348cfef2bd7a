//! Task source and result sink glue.
//!
//! Tasks come from a JSON array of rows or a tab-separated file with the
//! columns `vendor, url, selector, notes`. Reports go out as JSON, plus a
//! single dated price column for spreadsheet pasting.

use crate::orchestrator::BatchReport;
use crate::task::Task;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// A task row as it appears in a JSON task file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskRow {
    pub vendor: String,
    pub url: String,
    pub selector: String,
    pub notes: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task::from_row(&row.vendor, &row.url, &row.selector, &row.notes)
    }
}

/// Parse a JSON array of task rows
///
/// # Errors
///
/// Returns an error when the text is not a JSON array of row objects.
pub fn parse_json_tasks(text: &str) -> Result<Vec<Task>> {
    let rows: Vec<TaskRow> =
        serde_json::from_str(text).context("Task file is not a JSON array of rows")?;
    Ok(rows.into_iter().map(Task::from).collect())
}

/// Parse tab-separated rows: `vendor, url, selector, notes`.
///
/// Missing trailing columns are empty. A blank line inside the file is an
/// empty task so positions keep matching the source sheet; trailing blank
/// lines and a first line whose URL column reads `url` are skipped.
#[must_use]
pub fn parse_tsv_tasks(text: &str) -> Vec<Task> {
    let lines: Vec<&str> = text.lines().collect();
    let used = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);

    let mut tasks = Vec::with_capacity(used);
    for (line_no, line) in lines[..used].iter().enumerate() {
        let mut cols = line.split('\t');
        let vendor = cols.next().unwrap_or_default();
        let url = cols.next().unwrap_or_default();
        let selector = cols.next().unwrap_or_default();
        let notes = cols.next().unwrap_or_default();

        if line_no == 0 && url.trim().eq_ignore_ascii_case("url") {
            debug!("skipping header row");
            continue;
        }
        tasks.push(Task::from_row(vendor, url, selector, notes));
    }
    tasks
}

/// Read tasks from `path`; `.json` files are JSON, anything else TSV
///
/// # Errors
///
/// Returns an error if the file cannot be read or JSON input is malformed.
pub async fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read task file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let tasks = if is_json {
        parse_json_tasks(&text)?
    } else {
        parse_tsv_tasks(&text)
    };

    info!(tasks = tasks.len(), path = %path.display(), "loaded tasks");
    Ok(tasks)
}

/// Write the full report as pretty JSON, creating parent directories
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    ensure_parent(path).await?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// Write one dated price column: a header line, then one cell per task
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn write_price_column(path: &Path, date: NaiveDate, report: &BatchReport) -> Result<()> {
    let mut out = price_column_header(date);
    out.push('\n');
    for cell in report.price_cells() {
        out.push_str(cell);
        out.push('\n');
    }
    ensure_parent(path).await?;
    tokio::fs::write(path, out)
        .await
        .with_context(|| format!("Failed to write price column {}", path.display()))?;
    Ok(())
}

/// `Price M/D` with no zero padding
#[must_use]
pub fn price_column_header(date: NaiveDate) -> String {
    format!("Price {}/{}", date.month(), date.day())
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::FLAG_SELECTOR_ONLY;

    #[test]
    fn header_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(price_column_header(date), "Price 3/7");
    }

    #[test]
    fn tsv_rows_keep_order_and_blank_urls() {
        let text = "vendor\turl\tselector\tnotes\n\
                    Acme\thttps://acme.test/a\t.price\tselector-only\n\
                    \n\
                    Acme\t\n\
                    Bolt\thttps://bolt.test/b\n";
        let tasks = parse_tsv_tasks(text);
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].selector(), Some(".price"));
        assert!(tasks[0].has_flag(FLAG_SELECTOR_ONLY));
        assert_eq!(tasks[1].url(), "");
        assert_eq!(tasks[1].vendor(), "");
        assert_eq!(tasks[2].url(), "");
        assert_eq!(tasks[2].vendor(), "Acme");
        assert_eq!(tasks[3].vendor(), "Bolt");
        assert_eq!(tasks[3].selector(), None);
    }

    #[test]
    fn tab_only_rows_hold_their_position() {
        let tasks = parse_tsv_tasks("Acme\thttps://acme.test/a\n\t\t\t\nBolt\thttps://bolt.test/b\n\n\n");
        let urls: Vec<&str> = tasks.iter().map(Task::url).collect();
        assert_eq!(urls, vec!["https://acme.test/a", "", "https://bolt.test/b"]);
    }

    #[test]
    fn blank_file_has_no_tasks() {
        assert!(parse_tsv_tasks("\n\n").is_empty());
        assert!(parse_tsv_tasks("").is_empty());
    }

    #[test]
    fn json_rows_default_missing_fields() {
        let tasks = parse_json_tasks(
            r##"[{"vendor": "Acme", "url": "https://acme.test/a", "notes": "no-proxy"},
                {"url": "https://bolt.test/b", "selector": "#cost"}]"##,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(!tasks[0].allows_proxy());
        assert_eq!(tasks[1].vendor(), "");
        assert_eq!(tasks[1].selector(), Some("#cost"));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(parse_json_tasks(r#"{"url": "x"}"#).is_err());
    }
}
