//! Batch execution: fan companies out over a bounded number of concurrent
//! crawls and summarize the run.
//!
//! Concurrency here bounds whole-company pipelines; the fetcher separately
//! bounds in-flight requests and per-domain pacing, so the two limits
//! compose rather than conflict.

use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::crawler::CompanyCrawler;
use crate::types::{CompanyRecord, CrawlResult, UNKNOWN_INDUSTRY};

/// Aggregate counters for one finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub failed: usize,
    pub with_employee_count: usize,
    pub with_industry: usize,
    pub translated: usize,
    pub elapsed_secs: u64,
}

impl RunSummary {
    pub fn from_results(results: &[CrawlResult], started: Instant) -> Self {
        Self {
            total: results.len(),
            failed: results.iter().filter(|r| r.error.is_some()).count(),
            with_employee_count: results
                .iter()
                .filter(|r| r.employee_count.is_some())
                .count(),
            with_industry: results
                .iter()
                .filter(|r| r.industry != UNKNOWN_INDUSTRY)
                .count(),
            translated: results.iter().filter(|r| r.translated).count(),
            elapsed_secs: started.elapsed().as_secs(),
        }
    }

    pub fn log(&self) {
        tracing::info!(
            total = self.total,
            failed = self.failed,
            with_employee_count = self.with_employee_count,
            with_industry = self.with_industry,
            translated = self.translated,
            elapsed_secs = self.elapsed_secs,
            "run finished"
        );
    }
}

/// Crawl every company, at most `concurrency` at a time. The output has
/// exactly one result per input company, in input order.
pub async fn run_batch(
    crawler: &CompanyCrawler,
    companies: &[CompanyRecord],
    concurrency: usize,
) -> Vec<CrawlResult> {
    let mut indexed: Vec<(usize, CrawlResult)> = stream::iter(companies.iter().enumerate())
        .map(|(index, company)| {
            let crawler = crawler.clone();
            async move { (index, crawler.crawl(company).await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::tables::ReferenceTables;
    use crate::traits::{LanguageService, PageFetcher};
    use crate::types::FetchedPage;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Fetcher that refuses every request, so each crawl fails fast.
    struct DownFetcher;

    #[async_trait]
    impl PageFetcher for DownFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage> {
            Err(anyhow!("connection refused"))
        }

        async fn probe(&self, _url: &str) -> bool {
            false
        }
    }

    struct NoopLanguage;

    #[async_trait]
    impl LanguageService for NoopLanguage {
        async fn detect(&self, _sample: &str) -> Option<String> {
            None
        }

        async fn translate(&self, text: &str, _source: Option<&str>) -> String {
            text.to_string()
        }
    }

    #[tokio::test]
    async fn every_company_yields_exactly_one_result_in_input_order() {
        let crawler = CompanyCrawler::new(
            Arc::new(DownFetcher),
            Arc::new(NoopLanguage),
            Arc::new(ReferenceTables::default()),
            CrawlConfig::default(),
        );
        let companies: Vec<CompanyRecord> = (0..5)
            .map(|i| CompanyRecord::new(format!("Company {}", i), format!("c{}.example", i)))
            .collect();

        let results = run_batch(&crawler, &companies, 3).await;

        assert_eq!(results.len(), companies.len());
        for (company, result) in companies.iter().zip(&results) {
            assert_eq!(result.company_name, company.name);
            assert!(result.error.is_some());
        }
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let crawler = CompanyCrawler::new(
            Arc::new(DownFetcher),
            Arc::new(NoopLanguage),
            Arc::new(ReferenceTables::default()),
            CrawlConfig::default(),
        );
        let companies = vec![CompanyRecord::new("Solo", "solo.example")];
        let results = run_batch(&crawler, &companies, 0).await;
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn summary_counts_failures_and_signals() {
        let company = CompanyRecord::new("A", "a.example");
        let mut ok = CrawlResult::empty(&company, "EU");
        ok.employee_count = Some(45);
        ok.industry = "Manufacturing".to_string();
        let failed = CrawlResult::from_fetch_failure(&company, "https://a.example", "EU", "down");

        let summary = RunSummary::from_results(&[ok, failed], Instant::now());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.with_employee_count, 1);
        assert_eq!(summary.with_industry, 1);
    }
}
