// Command-line batch runner: read tasks, resolve prices, write the report.
//
// Flags override the environment configuration read by
// `PriceScrapeConfig::from_env`.

use anyhow::{Context, Result};
use clap::Parser;
use kodegen_tools_pricescrape::config::PriceScrapeConfigBuilder;
use kodegen_tools_pricescrape::{Orchestrator, io};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Resolve current prices for a list of product URLs
#[derive(Parser, Debug)]
#[command(name = "kodegen-pricescrape")]
#[command(version)]
struct Cli {
    /// Task file: a JSON array of rows, or TSV `vendor, url, selector, notes`
    tasks: PathBuf,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "price_report.json")]
    out: PathBuf,

    /// Also write a dated single-column price file here
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Run Chromium headless
    #[arg(long, conflicts_with = "headed")]
    headless: bool,

    /// Run Chromium with a visible window
    #[arg(long)]
    headed: bool,

    /// Number of pooled browser sessions
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Disable stealth script injection
    #[arg(long)]
    no_stealth: bool,

    /// Renderer fallback command; the URL is appended as the last argument
    #[arg(long)]
    renderer: Option<String>,
}

impl Cli {
    fn apply(&self, mut builder: PriceScrapeConfigBuilder) -> PriceScrapeConfigBuilder {
        if self.headless {
            builder = builder.headless(true);
        }
        if self.headed {
            builder = builder.headless(false);
        }
        if let Some(n) = self.concurrency {
            builder = builder.concurrency(n);
        }
        if self.no_stealth {
            builder = builder.stealth_mode(false);
        }
        if let Some(command) = &self.renderer {
            builder = builder.renderer_command(command.clone());
        }
        builder
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let builder = PriceScrapeConfigBuilder::from_lookup(|name| std::env::var(name).ok())?;
    let config = cli.apply(builder).build().context("Invalid configuration")?;
    info!(?config, "configuration loaded");

    let tasks = io::read_tasks(&cli.tasks).await?;
    let orchestrator = Orchestrator::new(config)?;
    let report = orchestrator.run_batch(tasks).await;

    io::write_report(&cli.out, &report).await?;

    let today = chrono::Local::now().date_naive();
    if let Some(path) = &cli.prices {
        io::write_price_column(path, today, &report).await?;
    }

    println!(
        "{}: {} of {} priced, {} errors, report at {}",
        io::price_column_header(today),
        report.found_count(),
        report.len(),
        report.errors().len(),
        cli.out.display()
    );
    Ok(())
}
