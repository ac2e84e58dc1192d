use anyhow::Result;
use async_trait::async_trait;

use crate::types::FetchedPage;

// ============================================================================
// FETCHING: network access (injected so the pipeline runs without it)
// ============================================================================

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one URL. Rate limiting and per-domain serialization are the
    /// implementation's responsibility.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Lightweight existence check, used to probe English-variant URLs
    /// before committing to a full fetch.
    async fn probe(&self, url: &str) -> bool;
}

// ============================================================================
// LANGUAGE: detection + translation as one external service
// ============================================================================

#[async_trait]
pub trait LanguageService: Send + Sync {
    /// ISO 639-1 code of the sample's language, or `None` when the sample is
    /// too short or ambiguous.
    async fn detect(&self, sample: &str) -> Option<String>;

    /// Translate to English. Must not fail outward: on timeout or service
    /// error the input comes back unchanged, as it does for empty input or
    /// text already in English.
    async fn translate(&self, text: &str, source_lang: Option<&str>) -> String;
}
