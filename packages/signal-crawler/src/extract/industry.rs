//! Industry classification by weighted keyword scoring across text sources.
//!
//! Each source (company name, translated content, generic body text) carries
//! a fixed weight. Per-industry exclusion phrases are masked out of the text
//! before counting, so "healthcare software" never scores for the software
//! industry. The winner must clear a minimum score; ties keep the
//! first-declared category.

use crate::tables::ReferenceTables;
use crate::types::{IndustrySignal, UNKNOWN_INDUSTRY};

/// One weighted text source. Texts must be lowercased by the caller.
#[derive(Debug, Clone, Copy)]
pub struct TextSource<'a> {
    pub text: &'a str,
    pub weight: u32,
    pub label: &'static str,
}

pub const WEIGHT_COMPANY_NAME: u32 = 3;
pub const WEIGHT_TRANSLATED: u32 = 2;
pub const WEIGHT_BODY: u32 = 1;

/// Keywords shorter than this are too noisy to count.
const MIN_KEYWORD_CHARS: usize = 3;

pub fn extract_industry(
    sources: &[TextSource<'_>],
    tables: &ReferenceTables,
    min_score: u32,
) -> IndustrySignal {
    let mut best: Option<(usize, u32, Vec<String>)> = None;

    for (index, profile) in tables.industries.iter().enumerate() {
        let mut score = 0u32;
        let mut matched: Vec<String> = Vec::new();

        for source in sources {
            let masked = mask_exclusions(source.text, &profile.exclusions);
            for keyword in &profile.keywords {
                if keyword.chars().count() < MIN_KEYWORD_CHARS {
                    continue;
                }
                let hits = count_phrase(&masked, keyword);
                if hits > 0 {
                    score += hits * source.weight;
                    if !matched.contains(keyword) {
                        matched.push(keyword.clone());
                    }
                }
            }
        }

        // Strictly greater keeps the first-declared category on ties.
        if score > 0 && best.as_ref().map_or(true, |(_, s, _)| score > *s) {
            best = Some((index, score, matched));
        }
    }

    match best {
        Some((index, score, matched)) if score >= min_score => {
            let label = tables.industries[index].label.clone();
            let reasoning = vec![format!(
                "keywords matched for {}: {} (score {})",
                label,
                matched.join(", "),
                score
            )];
            IndustrySignal {
                industry: label,
                matched_keywords: matched,
                score,
                reasoning,
            }
        }
        _ => IndustrySignal {
            industry: UNKNOWN_INDUSTRY.to_string(),
            matched_keywords: Vec::new(),
            score: best.map(|(_, s, _)| s).unwrap_or(0),
            reasoning: vec!["no clear industry indicators found".to_string()],
        },
    }
}

/// Blank out every occurrence of the exclusion phrases before counting.
fn mask_exclusions(text: &str, exclusions: &[String]) -> String {
    let mut masked = text.to_string();
    for phrase in exclusions {
        if phrase.is_empty() {
            continue;
        }
        while let Some(pos) = masked.find(phrase.as_str()) {
            masked.replace_range(pos..pos + phrase.len(), &" ".repeat(phrase.len()));
        }
    }
    masked
}

/// Count word-boundary occurrences of a (possibly multi-word) phrase.
fn count_phrase(text: &str, phrase: &str) -> u32 {
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = text[offset..].find(phrase) {
        let start = offset + pos;
        let end = start + phrase.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            count += 1;
        }
        offset = end;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Vec<TextSource<'_>> {
        vec![TextSource {
            text,
            weight: WEIGHT_BODY,
            label: "body",
        }]
    }

    #[test]
    fn repeated_keyword_in_single_weighted_source_scores_per_match() {
        let tables = ReferenceTables::default();
        let text = "our bank is a modern bank, the best bank in town";
        let signal = extract_industry(&body(text), &tables, 2);
        assert_eq!(signal.industry, "Financial Services (excl. Fintech)");
        assert_eq!(signal.score, 3);
    }

    #[test]
    fn below_threshold_aggregate_yields_unknown() {
        let tables = ReferenceTables::default();
        let signal = extract_industry(&body("we are a bank"), &tables, 2);
        assert_eq!(signal.industry, UNKNOWN_INDUSTRY);
        assert_eq!(signal.score, 1);
    }

    #[test]
    fn exclusion_phrases_suppress_cross_domain_hits() {
        let tables = ReferenceTables::default();
        let text = "our healthcare software helps hospital teams";
        let signal = extract_industry(&body(text), &tables, 2);
        // "software" inside "healthcare software" must not count; "hospital"
        // plus nothing else is below threshold on body weight alone.
        assert_ne!(signal.industry, "Software & Internet (incl. Video Games)");
    }

    #[test]
    fn company_name_outweighs_body_text() {
        let tables = ReferenceTables::default();
        let sources = vec![
            TextSource {
                text: "meadow consulting",
                weight: WEIGHT_COMPANY_NAME,
                label: "company_name",
            },
            TextSource {
                text: "we also run a small cafe for staff",
                weight: WEIGHT_BODY,
                label: "body",
            },
        ];
        let signal = extract_industry(&sources, &tables, 2);
        assert_eq!(signal.industry, "Business Services");
        assert!(signal.matched_keywords.contains(&"consulting".to_string()));
    }

    #[test]
    fn word_boundaries_are_respected() {
        assert_eq!(count_phrase("bank banking embankment bank", "bank"), 2);
        // Strict boundary: the plural "firms" does not match the phrase.
        assert_eq!(count_phrase("law firm and law firms", "law firm"), 1);
    }

    #[test]
    fn ties_keep_first_declared_category() {
        let tables = ReferenceTables::default();
        // "consulting" (Business Services, declared first) and "bank"
        // (Financial Services) both score 2 on a double mention.
        let text = "consulting consulting bank bank";
        let signal = extract_industry(&body(text), &tables, 2);
        assert_eq!(signal.industry, "Business Services");
    }
}
