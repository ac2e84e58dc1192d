//! Per-company crawl pipeline.
//!
//! Each company moves through a fixed sequence: one probe round for an
//! English site variant, fetch the primary page, detect language, translate
//! when needed, run the extractors, and fetch up to two supplementary pages
//! when the primary page left signals unresolved. The
//! pipeline always produces exactly one [`CrawlResult`], even on failure or
//! when the per-company time budget runs out.

use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::config::CrawlConfig;
use crate::discovery::{discover_candidates, harvest_links};
use crate::error::CrawlError;
use crate::extract::{
    extract_employees, extract_industry, extract_region, TextSource, WEIGHT_BODY,
    WEIGHT_COMPANY_NAME, WEIGHT_TRANSLATED,
};
use crate::normalize::{detection_sample, normalize_for_scanning, parse_page, translation_excerpt};
use crate::tables::ReferenceTables;
use crate::traits::{LanguageService, PageFetcher};
use crate::types::{CompanyRecord, CrawlResult, RegionTier, UNKNOWN_INDUSTRY};

// ============================================================================
// BUDGET
// ============================================================================

/// Wall-clock and page-count budget for one company. Exhaustion forces early
/// completion with whatever signals were gathered, never an error.
struct CrawlBudget {
    deadline: Instant,
    pages_fetched: usize,
    max_pages: usize,
}

impl CrawlBudget {
    fn new(config: &CrawlConfig) -> Self {
        Self {
            deadline: Instant::now() + config.company_time_budget,
            pages_fetched: 0,
            max_pages: config.max_pages_per_company,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Reserve one page fetch; `false` once the page cap or deadline is hit.
    fn take_page(&mut self) -> bool {
        if self.expired() || self.pages_fetched >= self.max_pages {
            return false;
        }
        self.pages_fetched += 1;
        true
    }
}

// ============================================================================
// PER-PAGE ANALYSIS
// ============================================================================

/// Everything the extractors produced for one fetched page.
struct PageAnalysis {
    detected_language: Option<String>,
    translated: bool,
    /// Lowercased, numeral-normalized original body.
    normalized_body: String,
    /// Lowercased translated excerpt, present only when translation applied.
    translated_excerpt: Option<String>,
}

// ============================================================================
// CRAWLER
// ============================================================================

/// Runs the full pipeline for one company at a time. Cheap to clone; all
/// capabilities are shared behind `Arc`.
#[derive(Clone)]
pub struct CompanyCrawler {
    fetcher: Arc<dyn PageFetcher>,
    language: Arc<dyn LanguageService>,
    tables: Arc<ReferenceTables>,
    config: CrawlConfig,
}

impl CompanyCrawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        language: Arc<dyn LanguageService>,
        tables: Arc<ReferenceTables>,
        config: CrawlConfig,
    ) -> Self {
        Self {
            fetcher,
            language,
            tables,
            config,
        }
    }

    /// Crawl one company end to end. Never fails outward: fetch failures and
    /// budget exhaustion both surface inside the returned record.
    pub async fn crawl(&self, company: &CompanyRecord) -> CrawlResult {
        let started = Instant::now();
        let mut budget = CrawlBudget::new(&self.config);
        let mut result = CrawlResult::empty(company, &self.config.fallback_region);
        let mut region_tier = RegionTier::Fallback;
        let mut language_usable = false;

        let base_url = base_url_for(&company.domain);
        result.url = base_url.clone();

        // START: the single probe round for an English-language site variant.
        // Its outcome stands for the whole crawl; a non-English primary page
        // never triggers a second round over the same candidate list.
        let mut english_variant = None;
        let mut primary_url = base_url.clone();
        if !budget.expired() {
            english_variant = self.probe_english_variants(&company.domain).await;
        }
        if let Some(variant) = &english_variant {
            tracing::debug!(company = %company.name, url = %variant, "english variant found");
            primary_url = variant.clone();
        }

        // PRIMARY_FETCH: failure here is the only terminal error.
        if !budget.take_page() {
            result.reasoning.push("time budget exhausted before primary fetch".to_string());
            return self.finish(result, region_tier, language_usable, started);
        }
        let page = match self.fetcher.fetch(&primary_url).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(company = %company.name, url = %primary_url, error = %err, "primary fetch failed");
                return CrawlResult::from_fetch_failure(
                    company,
                    &primary_url,
                    &self.config.fallback_region,
                    CrawlError::fetch(err),
                );
            }
        };
        if !(200..300).contains(&page.status) {
            let mut failed = CrawlResult::from_fetch_failure(
                company,
                &page.final_url,
                &self.config.fallback_region,
                CrawlError::FetchFailure(format!("HTTP status {}", page.status)),
            );
            failed.http_status = Some(page.status);
            return failed;
        }
        result.url = page.final_url.clone();
        result.http_status = Some(page.status);
        result.record_visit(&page.final_url);

        // EXTRACT on the primary page. When the probe round found no English
        // variant, a non-English page goes straight to translation.
        let parsed = parse_page(&page.body);
        let detected = self
            .language
            .detect(&detection_sample(&parsed, &self.config))
            .await;

        let analysis = self.analyze_language(&parsed, detected).await;
        if analysis.detected_language.is_none() {
            result.reasoning.push(
                CrawlError::DetectionFailure(
                    "sample inconclusive, treated as English".to_string(),
                )
                .to_string(),
            );
        }
        if analysis.detected_language.as_deref().is_some_and(|l| l != "en")
            && !analysis.translated
        {
            result.reasoning.push(
                CrawlError::TranslationFailure(
                    "translation unavailable, scanning original text".to_string(),
                )
                .to_string(),
            );
        }
        if analysis.detected_language.as_deref().map_or(true, |l| l == "en")
            || analysis.translated
        {
            language_usable = true;
        }
        result.detected_language = analysis.detected_language.clone();
        result.translated = analysis.translated;
        self.merge_signals(company, &mut result, &mut region_tier, &analysis);

        // SUPPLEMENTARY: only when the primary page left signals unresolved.
        let needs_more = result.employee_count.is_none()
            || result.industry == UNKNOWN_INDUSTRY
            || result.translated;
        if needs_more && !budget.expired() {
            let links = harvest_links(&page.body);
            let candidates = discover_candidates(
                &links,
                &page.final_url,
                self.language.as_ref(),
                &self.config,
            )
            .await;

            let mut fetched = 0usize;
            for candidate in candidates {
                if fetched >= self.config.max_supplementary_pages {
                    break;
                }
                if result.pages_visited.iter().any(|v| *v == candidate) {
                    continue;
                }
                if !budget.take_page() {
                    result
                        .reasoning
                        .push("crawl budget exhausted before all supplementary pages".to_string());
                    break;
                }
                fetched += 1;
                match self.fetcher.fetch(&candidate).await {
                    Ok(extra) if (200..300).contains(&extra.status) => {
                        result.record_visit(&extra.final_url);
                        let extra_parsed = parse_page(&extra.body);
                        let extra_detected = self
                            .language
                            .detect(&detection_sample(&extra_parsed, &self.config))
                            .await;
                        let extra_analysis =
                            self.analyze_language(&extra_parsed, extra_detected).await;
                        self.merge_signals(company, &mut result, &mut region_tier, &extra_analysis);
                    }
                    Ok(extra) => {
                        tracing::debug!(url = %candidate, status = extra.status, "supplementary page skipped");
                    }
                    Err(err) => {
                        tracing::debug!(url = %candidate, error = %err, "supplementary fetch failed");
                    }
                }
            }
        }

        self.finish(result, region_tier, language_usable, started)
    }

    /// Probe the English-variant URL candidates; first responsive one wins.
    async fn probe_english_variants(&self, domain: &str) -> Option<String> {
        for candidate in english_variant_urls(domain) {
            if self.fetcher.probe(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    /// Detect-and-translate for one parsed page. Translation is bounded and
    /// degrades to the original text, leaving `translated` false.
    async fn analyze_language(
        &self,
        parsed: &crate::normalize::PageText,
        detected: Option<String>,
    ) -> PageAnalysis {
        let normalized_body = normalize_for_scanning(&parsed.full_text);

        let needs_translation = detected.as_deref().is_some_and(|l| l != "en");
        let translated_excerpt = if needs_translation {
            // Title, meta, and number-bearing blocks first: the character cap
            // must not be eaten by navigation boilerplate.
            let excerpt = translation_excerpt(parsed, self.config.translation_max_chars);
            let translated = self
                .language
                .translate(&excerpt, detected.as_deref())
                .await;
            if translated != excerpt {
                Some(normalize_for_scanning(&translated))
            } else {
                None
            }
        } else {
            None
        };

        PageAnalysis {
            detected_language: detected,
            translated: translated_excerpt.is_some(),
            normalized_body,
            translated_excerpt,
        }
    }

    /// Run the extractors over one analyzed page and fold the signals into
    /// the result. Later pages only fill fields still at their defaults.
    fn merge_signals(
        &self,
        company: &CompanyRecord,
        result: &mut CrawlResult,
        region_tier: &mut RegionTier,
        analysis: &PageAnalysis,
    ) {
        // Employee count: scan the translated excerpt first, then fall back
        // to the original text, which often retains the numeric phrasing.
        if result.employee_count.is_none() {
            let mut signal = analysis
                .translated_excerpt
                .as_deref()
                .map(|text| extract_employees(text, &self.tables))
                .filter(|s| s.count.is_some())
                .unwrap_or_default();
            if signal.count.is_none() {
                signal = extract_employees(&analysis.normalized_body, &self.tables);
            }
            if signal.count.is_some() {
                result.employee_count = signal.count;
                result.employee_count_range = signal.range.clone();
                result.size_category = self.tables.size_for_range(signal.range.as_deref());
            }
            result.reasoning.extend(signal.reasoning);
        }

        // Region: a page can only upgrade the tier, never replace evidence
        // of equal or higher rank.
        let region = extract_region(
            &analysis.normalized_body,
            &result.domain,
            &self.tables,
            &self.config.fallback_region,
        );
        if tier_rank(region.tier) < tier_rank(*region_tier) {
            *region_tier = region.tier;
            result.region = region.region;
            result.reasoning.extend(region.reasoning);
        }

        // Industry: company name outweighs translated content, which
        // outweighs raw body text.
        if result.industry == UNKNOWN_INDUSTRY {
            let name = company.name.to_lowercase();
            let mut sources = vec![TextSource {
                text: &name,
                weight: WEIGHT_COMPANY_NAME,
                label: "company_name",
            }];
            if let Some(translated) = analysis.translated_excerpt.as_deref() {
                sources.push(TextSource {
                    text: translated,
                    weight: WEIGHT_TRANSLATED,
                    label: "translated",
                });
            }
            sources.push(TextSource {
                text: &analysis.normalized_body,
                weight: WEIGHT_BODY,
                label: "body",
            });
            let industry = extract_industry(&sources, &self.tables, self.config.min_industry_score);
            if industry.industry != UNKNOWN_INDUSTRY {
                result.industry = industry.industry;
                result.reasoning.extend(industry.reasoning);
            }
        }
    }

    /// Final bookkeeping: confidence score and duration log.
    fn finish(
        &self,
        mut result: CrawlResult,
        region_tier: RegionTier,
        language_usable: bool,
        started: Instant,
    ) -> CrawlResult {
        let weights = &self.config.confidence;
        let mut score = 0.0f32;
        if result.employee_count.is_some() {
            score += weights.employee_count;
        }
        if result.industry != UNKNOWN_INDUSTRY {
            score += weights.industry;
        }
        if region_tier != RegionTier::Fallback {
            score += weights.region;
        }
        if language_usable {
            score += weights.translation;
        }
        result.confidence_score = score;

        tracing::info!(
            company = %result.company_name,
            pages = result.pages_visited.len(),
            employee_count = ?result.employee_count,
            industry = %result.industry,
            region = %result.region,
            confidence = result.confidence_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "company crawl finished"
        );
        result
    }
}

fn tier_rank(tier: RegionTier) -> u8 {
    match tier {
        RegionTier::DomainExtension => 0,
        RegionTier::CountryMention => 1,
        RegionTier::Fallback => 2,
    }
}

// ============================================================================
// URL HELPERS
// ============================================================================

/// Primary URL for a raw input domain, which may or may not carry a scheme.
pub fn base_url_for(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Candidate URLs for an English-language site variant, probed in order.
pub fn english_variant_urls(domain: &str) -> Vec<String> {
    let base = base_url_for(domain);
    let Ok(url) = Url::parse(&base) else {
        return Vec::new();
    };
    let Some(host) = url.host_str() else {
        return Vec::new();
    };
    let bare = host.trim_start_matches("www.");

    let mut candidates = vec![
        format!("https://{}/en", host),
        format!("https://{}/en/", host),
        format!("https://{}/english", host),
        format!("https://{}/english/", host),
        format!("https://en.{}", bare),
    ];
    if host == bare {
        candidates.push(format!("https://www.{}/en", bare));
    }
    candidates.dedup();
    candidates
}
