use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Crawl-wide tuning knobs. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Region assigned when neither domain nor text yields evidence.
    pub fallback_region: String,
    /// Minimum aggregate keyword score before an industry is accepted.
    pub min_industry_score: u32,
    /// Primary page + supplementary pages, per company.
    pub max_pages_per_company: usize,
    /// Supplementary URLs actually fetched out of the discovery list.
    pub max_supplementary_pages: usize,
    /// Candidate URLs returned by page discovery.
    pub max_discovery_candidates: usize,
    /// Wall-clock budget per company; exceeding it forces early completion.
    pub company_time_budget: Duration,
    /// Hard bound on a single translation call.
    pub translation_timeout: Duration,
    /// Characters handed to the translator per call.
    pub translation_max_chars: usize,
    /// Content blocks sampled for language detection.
    pub detection_sample_blocks: usize,
    /// Minimum length for a block to count toward the detection sample.
    pub detection_block_min_chars: usize,
    /// Fallback sample size when the structured sample is too short.
    pub detection_fallback_chars: usize,
    /// Minimum delay between two requests to the same domain.
    pub per_domain_delay: Duration,
    /// Global in-flight request cap across all companies.
    pub max_in_flight_requests: usize,
    /// Request timeout for a single fetch.
    pub fetch_timeout: Duration,
    /// Confidence weights for the final score.
    pub confidence: ConfidenceWeights,
}

/// Weight of each independently established signal in `confidence_score`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub employee_count: f32,
    pub industry: f32,
    pub region: f32,
    pub translation: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            employee_count: 0.35,
            industry: 0.30,
            region: 0.20,
            translation: 0.15,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            fallback_region: "EU".to_string(),
            min_industry_score: 2,
            max_pages_per_company: 3,
            max_supplementary_pages: 2,
            max_discovery_candidates: 7,
            company_time_budget: Duration::from_secs(90),
            translation_timeout: Duration::from_secs(10),
            translation_max_chars: 500,
            detection_sample_blocks: 10,
            detection_block_min_chars: 30,
            detection_fallback_chars: 1000,
            per_domain_delay: Duration::from_millis(1500),
            max_in_flight_requests: 3,
            fetch_timeout: Duration::from_secs(20),
            confidence: ConfidenceWeights::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_fallback_region(mut self, region: impl Into<String>) -> Self {
        self.fallback_region = region.into();
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.company_time_budget = budget;
        self
    }

    pub fn with_translation_timeout(mut self, timeout: Duration) -> Self {
        self.translation_timeout = timeout;
        self
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight_requests = limit.max(1);
        self
    }

    pub fn with_per_domain_delay(mut self, delay: Duration) -> Self {
        self.per_domain_delay = delay;
        self
    }
}
