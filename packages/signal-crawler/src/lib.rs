pub mod config;
pub mod crawler;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod language;
pub mod normalize;
pub mod report;
pub mod runner;
pub mod tables;
pub mod traits;
pub mod types;

// Re-exports for clean API
pub use config::{ConfidenceWeights, CrawlConfig};
pub use crawler::CompanyCrawler;
pub use error::CrawlError;
pub use fetch::HttpFetcher;
pub use language::HttpLanguageService;
pub use report::{load_company_list, write_results};
pub use runner::{run_batch, RunSummary};
pub use tables::ReferenceTables;
pub use traits::{LanguageService, PageFetcher};
pub use types::{CompanyRecord, CrawlResult, FetchedPage, RegionTier};
