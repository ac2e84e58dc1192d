//! Markup stripping and text normalization.
//!
//! Turns raw HTML into the plain-text forms the extractors scan: a structured
//! page view (title, meta description, content blocks) for language
//! detection, and a lowercased, numeral-normalized body for pattern matching.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node, Selector};

use crate::config::CrawlConfig;

static BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h1, h2, h3, li").expect("valid selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META_DESC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).expect("valid selector"));

/// Grouped numerals: 1-3 leading digits then one or more 3-digit groups
/// joined by comma, space, apostrophe, or period.
static GROUPED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,3}(?:[,\.'’\s\u{a0}]\d{3})+\b").expect("valid regex")
});
static GROUP_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\.'’\s\u{a0}]").expect("valid regex"));
/// `word123word` runs left behind by markup stripping.
static CONCATENATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z]+)(\d+)([a-zA-Z]+)").expect("valid regex"));
static ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").expect("valid regex"));

/// Plain-text view of one fetched page.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub blocks: Vec<String>,
    pub full_text: String,
}

/// Strip markup down to the text the extractors care about.
pub fn parse_page(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let meta_description = document
        .select(&META_DESC_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty());

    let blocks: Vec<String> = document
        .select(&BLOCK_SELECTOR)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect();

    // Text nodes directly, skipping script/style payloads.
    let mut full = String::new();
    for node in document.tree.nodes() {
        if let Node::Text(text) = node.value() {
            let skip = node
                .parent()
                .and_then(|p| match p.value() {
                    Node::Element(el) => Some(matches!(
                        el.name(),
                        "script" | "style" | "noscript" | "head"
                    )),
                    _ => None,
                })
                .unwrap_or(false);
            if !skip {
                full.push_str(text);
                full.push(' ');
            }
        }
    }

    PageText {
        title,
        meta_description,
        blocks,
        full_text: collapse_whitespace(&full),
    }
}

/// Full normalization pipeline for pattern scanning: lowercase, ellipsis and
/// concatenation cleanup, numeral grouping removal, whitespace collapse.
pub fn normalize_for_scanning(text: &str) -> String {
    let lowered = text.to_lowercase();
    let deellipsed = ELLIPSIS.replace_all(&lowered, " ");
    let split = CONCATENATED.replace_all(&deellipsed, "$1 $2 $3");
    let normalized = normalize_numerals(&split);
    collapse_whitespace(&normalized)
}

/// Collapse grouped numerals ("3,000" / "3 000" / "3'000" / "3.000") into
/// plain digit runs so downstream patterns only match plain integers.
pub fn normalize_numerals(text: &str) -> String {
    GROUPED_NUMBER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            GROUP_SEPARATOR.replace_all(&caps[0], "").into_owned()
        })
        .into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Language-detection sample: title, meta description, and up to the
/// configured number of substantial content blocks. Falls back to a prefix of
/// the full body text when the structured sample is too short.
pub fn detection_sample(page: &PageText, config: &CrawlConfig) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(title) = &page.title {
        parts.push(title);
    }
    if let Some(desc) = &page.meta_description {
        parts.push(desc);
    }
    parts.extend(
        page.blocks
            .iter()
            .filter(|b| b.chars().count() >= config.detection_block_min_chars)
            .take(config.detection_sample_blocks)
            .map(String::as_str),
    );

    let sample = parts.join(" ");
    if sample.chars().count() >= config.detection_block_min_chars {
        return sample;
    }

    page.full_text
        .chars()
        .take(config.detection_fallback_chars)
        .collect()
}

/// Excerpt sent to translation: title, meta description, then content blocks
/// with number-bearing blocks first, so a tight character cap spends itself
/// on the text most likely to hold a headcount rather than on navigation
/// boilerplate. Falls back to a prefix of the full body for pages without
/// structured content.
pub fn translation_excerpt(page: &PageText, max_chars: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(title) = &page.title {
        parts.push(title);
    }
    if let Some(desc) = &page.meta_description {
        parts.push(desc);
    }
    let (numeric, plain): (Vec<&String>, Vec<&String>) = page
        .blocks
        .iter()
        .partition(|b| b.chars().any(|c| c.is_ascii_digit()));
    for block in numeric.into_iter().chain(plain) {
        if !parts.contains(&block.as_str()) {
            parts.push(block);
        }
    }

    let mut excerpt = String::new();
    for part in parts {
        if excerpt.chars().count() >= max_chars {
            break;
        }
        if !excerpt.is_empty() {
            excerpt.push(' ');
        }
        excerpt.push_str(part);
    }
    if excerpt.is_empty() {
        return page.full_text.chars().take(max_chars).collect();
    }
    excerpt.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeral_normalization_handles_all_separator_conventions() {
        for raw in ["3,000 employees", "3 000 employees", "3.000 employees", "3'000 employees"] {
            assert_eq!(normalize_numerals(raw), "3000 employees", "input: {raw}");
        }
        assert_eq!(normalize_numerals("1'000'000 visitors"), "1000000 visitors");
    }

    #[test]
    fn plain_numbers_and_decimals_are_left_alone() {
        assert_eq!(normalize_numerals("45 employees"), "45 employees");
        // Two-digit tail is not a thousands group.
        assert_eq!(normalize_numerals("version 3.14"), "version 3.14");
    }

    #[test]
    fn concatenated_words_are_split_before_scanning() {
        let out = normalize_for_scanning("Wysocyponad2500pracowników employees");
        assert!(out.contains("wysocyponad 2500 pracowników"), "got: {out}");
    }

    #[test]
    fn parse_page_skips_script_content() {
        let html = r#"<html><head><title>Acme BV</title>
            <meta name="description" content="We build things">
            <script>var employees = 99999;</script></head>
            <body><p>A consulting firm with 45 employees.</p></body></html>"#;
        let page = parse_page(html);
        assert_eq!(page.title.as_deref(), Some("Acme BV"));
        assert_eq!(page.meta_description.as_deref(), Some("We build things"));
        assert!(!page.full_text.contains("99999"));
        assert!(page.full_text.contains("45 employees"));
        assert_eq!(page.blocks.len(), 1);
    }

    #[test]
    fn detection_sample_falls_back_to_body_prefix() {
        let config = CrawlConfig::default();
        let page = PageText {
            title: None,
            meta_description: None,
            blocks: vec!["short".into()],
            full_text: "x".repeat(2000),
        };
        let sample = detection_sample(&page, &config);
        assert_eq!(sample.chars().count(), config.detection_fallback_chars);
    }

    #[test]
    fn detection_sample_prefers_structured_content() {
        let config = CrawlConfig::default();
        let page = PageText {
            title: Some("Acme".into()),
            meta_description: Some("Industrial machinery manufacturer".into()),
            blocks: vec![
                "We are a family business operating across Europe since long".into(),
                "tiny".into(),
            ],
            full_text: "unused fallback".into(),
        };
        let sample = detection_sample(&page, &config);
        assert!(sample.starts_with("Acme Industrial machinery"));
        assert!(sample.contains("family business"));
        assert!(!sample.contains("tiny"));
    }

    #[test]
    fn translation_excerpt_puts_number_bearing_blocks_before_boilerplate() {
        let page = PageText {
            title: Some("Acme BV".into()),
            meta_description: None,
            blocks: vec![
                "Home Producten Diensten Over ons Contact Nieuws Vacatures".into(),
                "Wij zijn een familiebedrijf met 45 medewerkers.".into(),
            ],
            full_text: "unused".into(),
        };
        let excerpt = translation_excerpt(&page, 80);
        assert!(excerpt.starts_with("Acme BV Wij zijn een familiebedrijf"));
        assert!(excerpt.contains("45 medewerkers"));
    }

    #[test]
    fn translation_excerpt_falls_back_to_body_prefix() {
        let page = PageText {
            title: None,
            meta_description: None,
            blocks: Vec::new(),
            full_text: "plain text with no structured blocks at all".into(),
        };
        let excerpt = translation_excerpt(&page, 20);
        assert_eq!(excerpt, "plain text with no s");
    }
}
