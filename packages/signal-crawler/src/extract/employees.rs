//! Employee-count extraction from normalized page text.
//!
//! Multilingual pattern scan, then false-positive filtering (years, customer
//! counts, implausible magnitudes), then largest-survivor selection. Input
//! must already be lowercased and numeral-normalized (see
//! `normalize::normalize_for_scanning`).

use std::sync::LazyLock;

use regex::Regex;

use crate::tables::ReferenceTables;
use crate::types::EmployeeSignal;

/// Characters of context kept on each side of a match for filtering and
/// reasoning.
const CONTEXT_CHARS: usize = 40;
/// Texts shorter than this are not worth scanning.
const MIN_SCAN_CHARS: usize = 20;
/// Plausible organization headcount.
const MIN_COUNT: u32 = 1;
const MAX_COUNT: u32 = 50_000;
/// Plausible calendar year, suspect when founding vocabulary is nearby.
const YEAR_MIN: u32 = 1900;
const YEAR_MAX: u32 = 2030;

/// Words after the number checked for customer vocabulary. A customer count
/// has its noun right there ("50000 satisfied customers"); a headcount
/// mentioned near customer copy does not ("customers and 12 employees").
const TRAILING_WORDS: usize = 3;

/// One pattern hit, kept only until the best match is selected.
#[derive(Debug, Clone)]
pub struct ExtractionMatch {
    pub raw_number: String,
    pub value: u32,
    pub context: String,
    /// The few words immediately following the number.
    pub trailing: String,
    pub pattern_id: &'static str,
}

struct CountPattern {
    id: &'static str,
    regex: Regex,
}

fn pattern(id: &'static str, source: &str) -> CountPattern {
    CountPattern {
        id,
        regex: Regex::new(source).expect("valid employee pattern"),
    }
}

/// Ordered, extensible pattern set. Group 1 is always the count.
static PATTERNS: LazyLock<Vec<CountPattern>> = LazyLock::new(|| {
    vec![
        // Direct: number immediately before a headcount noun.
        pattern(
            "direct",
            r"(\d+)\s*\+?\s*(?:employees?|people|staff|colleagues?|professionals?|specialists?|workers?|members?)",
        ),
        // Number with descriptive words before the noun ("120 dedicated employees").
        pattern(
            "direct-gap",
            r"(\d+)\s+(?:\w+\s+){1,5}?(?:employees?|colleagues?|professionals?|people|staff|workers?)",
        ),
        // "team of 45", "workforce of 300".
        pattern(
            "group-of",
            r"(?:team|staff|workforce|company|organization|firm)\s+of\s+(?:over|about|approximately|around)?\s*(\d+)",
        ),
        pattern(
            "employs",
            r"employ(?:s|ing)?\s+(?:over|about|approximately|around)?\s*(\d+)\s+(?:people|employees?|colleagues?|professionals?|staff|workers?)",
        ),
        pattern(
            "qualified",
            r"(?:over|more than|approximately|about|around|nearly)\s+(\d+)\s+(?:employees?|people|colleagues?|professionals?|staff|workers?)",
        ),
        pattern("strong", r"(\d+)[\s-]+strong\b"),
        // Known mistranslation artifacts ("we are tall 2500 employees",
        // Polish "ponad" rendered as tall/high).
        pattern(
            "artifact",
            r"(?:tall|high)\s+(\d+)\s+(?:\w+\s+){0,5}?(?:employees?|colleagues?|people)",
        ),
        // Dutch.
        pattern(
            "dutch",
            r"(\d+)\s+(?:enthousiaste\s+)?(?:medewerkers?|werknemers?|collega['’]s?)",
        ),
        pattern(
            "dutch-approx",
            r"(?:zo['’]n|ongeveer|circa|met)\s+(\d+)\s+(?:\w+\s+){0,3}?collega['’]s?",
        ),
        // Polish.
        pattern("polish", r"(\d+)\s*(?:pracowników|pracownikach)"),
        pattern(
            "polish-approx",
            r"(?:ponad|około)\s*(\d+)\s*(?:pracowników|pracownikach|osób)",
        ),
        pattern("polish-employs", r"(?:zatrudnia|zespół)\s*(\d+)\s*(?:pracowników|osób|ludzi)"),
        // German.
        pattern(
            "german",
            r"(?:mit\s+)?(?:über|etwa|rund)?\s*(\d+)\s+(?:mitarbeitern?|mitarbeiterinnen)",
        ),
        // Ranges take the lower bound.
        pattern(
            "range",
            r"(\d+)\s*[-–]\s*\d+\s+(?:employees?|people|colleagues?|professionals?|staff|workers?)",
        ),
        pattern(
            "between-range",
            r"between\s+(\d+)\s+and\s+\d+\s+(?:employees?|people|colleagues?|professionals?|staff)",
        ),
    ]
});

static FOUNDING_VOCAB: &[&str] = &[
    "since", "established", "founded", "year", "copyright", "©", "est.", "anno",
];

static CUSTOMER_VOCAB: &[&str] = &[
    "satisfied", "happy", "pleased", "customer", "consumer", "client", "visitor",
    "user", "subscriber", "follower", "review", "rating", "feedback", "shopper",
    "buyer", "guest", "attendee",
];

/// Extract the most plausible employee count from normalized text.
pub fn extract_employees(text: &str, tables: &ReferenceTables) -> EmployeeSignal {
    if text.chars().count() < MIN_SCAN_CHARS {
        return EmployeeSignal::default();
    }

    let matches = scan(text);
    if matches.is_empty() {
        return EmployeeSignal {
            count: None,
            range: None,
            reasoning: vec!["no employee count pattern matched".to_string()],
        };
    }

    let mut reasoning = Vec::new();
    let mut survivors: Vec<&ExtractionMatch> = Vec::new();
    for m in &matches {
        match rejection_reason(m) {
            Some(reason) => {
                tracing::debug!(value = m.value, reason, context = %m.context, "candidate rejected");
            }
            None => survivors.push(m),
        }
    }

    if survivors.is_empty() {
        reasoning.push(format!(
            "all {} candidate counts rejected as false positives",
            matches.len()
        ));
        return EmployeeSignal {
            count: None,
            range: None,
            reasoning,
        };
    }

    // Largest survivor wins: small numbers are disproportionately dates and
    // page fragments.
    let best = survivors
        .iter()
        .max_by_key(|m| m.value)
        .expect("survivors is non-empty");

    reasoning.push(format!(
        "employee count {} from pattern '{}' (matched \"{}\", context: \"{}\")",
        best.value, best.pattern_id, best.raw_number, best.context
    ));
    if survivors.len() > 1 {
        reasoning.push(format!(
            "{} candidate matches, selected highest",
            survivors.len()
        ));
    }

    let range = tables.bucket_for(best.value).map(str::to_string);
    EmployeeSignal {
        count: Some(best.value),
        range,
        reasoning,
    }
}

/// Run every pattern and collect hits with their context windows.
fn scan(text: &str) -> Vec<ExtractionMatch> {
    let mut matches = Vec::new();

    for pattern in PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let group = match caps.get(1) {
                Some(g) => g,
                None => continue,
            };
            // A number glued to a preceding digit or range dash is the tail
            // of a larger number or the upper bound of a range.
            if preceded_by_digit_or_dash(text, group.start()) {
                continue;
            }
            let value: u32 = match group.as_str().parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let whole = caps.get(0).expect("group 0 always present");
            matches.push(ExtractionMatch {
                raw_number: group.as_str().to_string(),
                value,
                context: context_window(text, whole.start(), whole.end()),
                trailing: trailing_words(text, group.end()),
                pattern_id: pattern.id,
            });
        }
    }

    matches
}

fn rejection_reason(m: &ExtractionMatch) -> Option<&'static str> {
    if (YEAR_MIN..=YEAR_MAX).contains(&m.value)
        && FOUNDING_VOCAB.iter().any(|v| m.context.contains(v))
    {
        return Some("calendar year in founding context");
    }
    if !(MIN_COUNT..=MAX_COUNT).contains(&m.value) {
        return Some("outside plausible organization size");
    }
    if quantifies_customers(&m.trailing) {
        return Some("number quantifies customers/visitors");
    }
    None
}

/// True when the words right after the number are customer vocabulary, i.e.
/// the number is counting customers rather than staff. Word-prefix match so
/// "customers" hits but "operating" does not trip on "rating".
fn quantifies_customers(trailing: &str) -> bool {
    trailing
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| CUSTOMER_VOCAB.iter().any(|v| word.starts_with(v)))
}

/// Up to `TRAILING_WORDS` words following a byte offset.
fn trailing_words(text: &str, from: usize) -> String {
    text[from..]
        .split_whitespace()
        .take(TRAILING_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn preceded_by_digit_or_dash(text: &str, byte_start: usize) -> bool {
    text[..byte_start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '–')
}

/// ±CONTEXT_CHARS characters around a byte span, respecting char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let before: String = text[..start]
        .chars()
        .rev()
        .take(CONTEXT_CHARS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after: String = text[end..].chars().take(CONTEXT_CHARS).collect();
    format!("{}{}{}", before, &text[start..end], after)
        .trim()
        .to_string()
}
