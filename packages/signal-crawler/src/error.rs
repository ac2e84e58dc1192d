use thiserror::Error;

/// Failure kinds inside a single company crawl.
///
/// None of these abort a run: every kind has a defined recovery that still
/// produces exactly one `CrawlResult` for the company.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network, DNS, timeout, or non-2xx response. Recovered by emitting a
    /// default-valued result with the error recorded.
    #[error("fetch failed: {0}")]
    FetchFailure(String),

    /// Translation timed out or the service errored. Recovered by continuing
    /// with the untranslated text.
    #[error("translation failed: {0}")]
    TranslationFailure(String),

    /// Language detection sample was ambiguous or too short. Recovered by
    /// treating the page as English.
    #[error("language detection failed: {0}")]
    DetectionFailure(String),
}

impl CrawlError {
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        Self::FetchFailure(err.to_string())
    }
}
