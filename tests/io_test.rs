//! Task files in, report files out

use chrono::NaiveDate;
use kodegen_tools_pricescrape::io::{read_tasks, write_price_column, write_report};
use kodegen_tools_pricescrape::{BatchReport, ExtractionOutcome, Task, Tier, normalize};
use tempfile::TempDir;

fn sample_report() -> BatchReport {
    BatchReport::from_results(vec![
        (
            Task::new("Acme", "https://acme.test/a"),
            ExtractionOutcome::found(normalize("$7.25").unwrap(), Tier::Script),
        ),
        (
            Task::new("Bolt", "https://bolt.test/b"),
            ExtractionOutcome::miss().with_error("all tiers exhausted: direct: no price"),
        ),
    ])
}

#[tokio::test]
async fn reads_tsv_and_json_task_files() {
    let dir = TempDir::new().unwrap();

    let tsv = dir.path().join("tasks.tsv");
    tokio::fs::write(
        &tsv,
        "Vendor\tURL\tSelector\tNotes\nAcme\thttps://acme.test/a\t.cost\tno-proxy, no-renderer\n",
    )
    .await
    .unwrap();
    let tasks = read_tasks(&tsv).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].selector(), Some(".cost"));
    assert!(!tasks[0].allows_proxy());
    assert!(!tasks[0].allows_renderer());

    let json = dir.path().join("tasks.JSON");
    tokio::fs::write(&json, r#"[{"vendor":"Bolt","url":"https://bolt.test/b"}]"#)
        .await
        .unwrap();
    let tasks = read_tasks(&json).await.unwrap();
    assert_eq!(tasks[0].vendor(), "Bolt");
}

#[tokio::test]
async fn missing_task_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = read_tasks(&dir.path().join("nope.tsv")).await.unwrap_err();
    assert!(format!("{err:#}").contains("nope.tsv"));
}

#[tokio::test]
async fn report_round_trips_through_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("report.json");

    let report = sample_report();
    write_report(&path, &report).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    let back: BatchReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);

    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw["results"][0]["outcome"]["price"], "$7.25");
    assert_eq!(raw["results"][0]["outcome"]["tier"], "script");
    assert_eq!(raw["errors"][0]["vendor"], "Bolt");
}

#[tokio::test]
async fn price_column_has_dated_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prices.txt");
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    write_price_column(&path, date, &sample_report()).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(text, "Price 10/18\n$7.25\n\n");
}
