// Command-line entry point for batch company crawls.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_crawler::{
    load_company_list, run_batch, write_results, CompanyCrawler, CrawlConfig, HttpFetcher,
    HttpLanguageService, ReferenceTables, RunSummary,
};

#[derive(Parser, Debug)]
#[command(name = "prospect", about = "Crawl company websites and extract firmographic signals")]
struct Args {
    /// Company list (semicolon-separated `Company;Domain` rows).
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = "results.csv")]
    output: PathBuf,

    /// Directory with reference table overrides (industry.csv, headcount.csv,
    /// regions.csv, size.csv). Built-in tables are used when absent.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Crawl at most this many companies from the list.
    #[arg(long)]
    max_companies: Option<usize>,

    /// Companies crawled concurrently.
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Per-company wall-clock budget in seconds.
    #[arg(long, default_value_t = 90)]
    time_budget_secs: u64,

    /// LibreTranslate-compatible endpoint (`POST /translate`). Translation
    /// is disabled when omitted; language detection still runs.
    #[arg(long)]
    translate_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,signal_crawler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let started = Instant::now();

    let mut companies = load_company_list(&args.input)
        .with_context(|| format!("loading company list from {}", args.input.display()))?;
    if let Some(limit) = args.max_companies {
        companies.truncate(limit);
    }
    tracing::info!(companies = companies.len(), "company list loaded");

    let tables = match &args.data_dir {
        Some(dir) => ReferenceTables::load(dir)
            .with_context(|| format!("loading reference tables from {}", dir.display()))?,
        None => ReferenceTables::default(),
    };

    let config = CrawlConfig::default()
        .with_time_budget(Duration::from_secs(args.time_budget_secs))
        .with_max_in_flight(args.concurrency);

    let fetcher = HttpFetcher::new(&config).context("building HTTP fetcher")?;
    let language = HttpLanguageService::new(args.translate_endpoint.clone(), &config);

    let crawler = CompanyCrawler::new(
        Arc::new(fetcher),
        Arc::new(language),
        Arc::new(tables),
        config,
    );

    let results = run_batch(&crawler, &companies, args.concurrency).await;

    write_results(&args.output, &results)
        .with_context(|| format!("writing results to {}", args.output.display()))?;

    let summary = RunSummary::from_results(&results, started);
    summary.log();
    tracing::info!(output = %args.output.display(), "results written");

    Ok(())
}
