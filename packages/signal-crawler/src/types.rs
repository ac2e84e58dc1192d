use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT
// ============================================================================

/// One input row: the identity unit of a crawl. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub domain: String,
}

impl CompanyRecord {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

// ============================================================================
// FETCHING
// ============================================================================

/// What the fetch capability hands back for one URL.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

// ============================================================================
// EXTRACTOR OUTPUTS
// ============================================================================

/// Output of the employee-count extractor for one page.
#[derive(Debug, Clone, Default)]
pub struct EmployeeSignal {
    pub count: Option<u32>,
    pub range: Option<String>,
    pub reasoning: Vec<String>,
}

/// Which tier of the region priority order fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionTier {
    DomainExtension,
    CountryMention,
    Fallback,
}

/// Output of the region extractor for one page.
#[derive(Debug, Clone)]
pub struct RegionSignal {
    pub region: String,
    pub tier: RegionTier,
    pub reasoning: Vec<String>,
}

/// Output of the industry extractor for one page.
#[derive(Debug, Clone)]
pub struct IndustrySignal {
    pub industry: String,
    pub matched_keywords: Vec<String>,
    pub score: u32,
    pub reasoning: Vec<String>,
}

pub const UNKNOWN_INDUSTRY: &str = "Unknown";
pub const UNKNOWN_SIZE: &str = "Unknown";

// ============================================================================
// RESULT
// ============================================================================

/// One finalized record per company, mutated across crawl stages.
///
/// Invariants: `region` is never empty (defaults to the configured fallback),
/// `size_category` is derived from `employee_count_range` and never set
/// independently, `pages_visited` only grows and never repeats a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub company_name: String,
    pub domain: String,
    pub url: String,
    pub http_status: Option<u16>,
    pub detected_language: Option<String>,
    pub translated: bool,
    pub employee_count: Option<u32>,
    pub employee_count_range: Option<String>,
    pub region: String,
    pub industry: String,
    pub size_category: String,
    pub reasoning: Vec<String>,
    pub pages_visited: Vec<String>,
    pub confidence_score: f32,
    pub error: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl CrawlResult {
    /// A syntactically complete record with every signal at its default.
    pub fn empty(company: &CompanyRecord, fallback_region: &str) -> Self {
        Self {
            company_name: company.name.clone(),
            domain: company.domain.clone(),
            url: String::new(),
            http_status: None,
            detected_language: None,
            translated: false,
            employee_count: None,
            employee_count_range: None,
            region: fallback_region.to_string(),
            industry: UNKNOWN_INDUSTRY.to_string(),
            size_category: UNKNOWN_SIZE.to_string(),
            reasoning: Vec::new(),
            pages_visited: Vec::new(),
            confidence_score: 0.0,
            error: None,
            scraped_at: Utc::now(),
        }
    }

    /// Terminal record for a company whose primary fetch failed.
    pub fn from_fetch_failure(
        company: &CompanyRecord,
        url: &str,
        fallback_region: &str,
        error: impl std::fmt::Display,
    ) -> Self {
        let mut result = Self::empty(company, fallback_region);
        result.url = url.to_string();
        result.error = Some(error.to_string());
        result
            .reasoning
            .push(format!("Error during crawl: {}", error));
        result
    }

    /// Append a visited URL, keeping the list duplicate-free.
    pub fn record_visit(&mut self, url: &str) {
        if !self.pages_visited.iter().any(|v| v == url) {
            self.pages_visited.push(url.to_string());
        }
    }
}
