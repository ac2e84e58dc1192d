//! Supplementary page discovery: rank about/team/contact-like URLs from a
//! page's links and navigation structure.
//!
//! Two passes (keyword, then navigation), a translation re-check for short
//! foreign anchor texts, and promotion of corporate-identity subdomains to
//! the front of the list.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};
use url::Url;

use crate::config::CrawlConfig;
use crate::normalize::collapse_whitespace;
use crate::traits::LanguageService;

static A_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Link relevance keywords, including common non-English "about us" forms.
static RELEVANCE_KEYWORDS: &[&str] = &[
    "about", "about-us", "company", "team", "contact", "careers",
    "über uns", "chi siamo", "quienes somos", "qui sommes-nous",
    "o nas", "over ons", "om oss",
];

/// Subdomain tokens that mark a corporate-identity host.
static CORPORATE_TOKENS: &[&str] = &["company", "about", "corporate"];

/// Anchor texts longer than this are not worth a translation call.
const MAX_TRANSLATABLE_ANCHOR: usize = 20;
const MIN_TRANSLATABLE_ANCHOR: usize = 4;

/// One link as harvested from a page.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub href: String,
    pub anchor: String,
    pub in_navigation: bool,
}

/// Pull links (with anchor text and navigation membership) out of raw HTML.
pub fn harvest_links(html: &str) -> Vec<PageLink> {
    let document = Html::parse_document(html);
    document
        .select(&A_SELECTOR)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            let anchor = collapse_whitespace(&el.text().collect::<String>());
            let in_navigation = el.ancestors().any(|node| match node.value() {
                Node::Element(parent) => {
                    matches!(parent.name(), "nav" | "header")
                        || parent.attr("class").is_some_and(|class| {
                            let class = class.to_lowercase();
                            class.contains("nav") || class.contains("menu")
                        })
                }
                _ => false,
            });
            Some(PageLink {
                href,
                anchor,
                in_navigation,
            })
        })
        .collect()
}

/// Rank supplementary URL candidates, most promising first, capped at the
/// configured discovery limit.
pub async fn discover_candidates<L>(
    links: &[PageLink],
    base_url: &str,
    language: &L,
    config: &CrawlConfig,
) -> Vec<String>
where
    L: LanguageService + ?Sized,
{
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let cap = config.max_discovery_candidates;
    let mut candidates: Vec<String> = Vec::new();

    // Pass 1: keyword matches in URL path or anchor text, with a translation
    // re-check for short anchors that didn't match directly.
    for link in links {
        if candidates.len() >= cap {
            break;
        }
        let Some(resolved) = resolve_same_domain(&base, &link.href) else {
            continue;
        };
        if candidates.contains(&resolved) {
            continue;
        }

        let haystack = format!("{} {}", resolved.to_lowercase(), link.anchor.to_lowercase());
        if RELEVANCE_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            candidates.push(resolved);
            continue;
        }

        let anchor_len = link.anchor.chars().count();
        if (MIN_TRANSLATABLE_ANCHOR..=MAX_TRANSLATABLE_ANCHOR).contains(&anchor_len) {
            let translated = language.translate(&link.anchor, None).await.to_lowercase();
            if RELEVANCE_KEYWORDS.iter().any(|k| translated.contains(k)) {
                tracing::debug!(anchor = %link.anchor, translated = %translated, "anchor matched after translation");
                candidates.push(resolved);
            }
        }
    }

    // Pass 2: primary-navigation links fill the remaining capacity.
    for link in links {
        if candidates.len() >= cap {
            break;
        }
        if !link.in_navigation {
            continue;
        }
        let Some(resolved) = resolve_same_domain(&base, &link.href) else {
            continue;
        };
        if !candidates.contains(&resolved) {
            candidates.push(resolved);
        }
    }

    promote_corporate_subdomains(&mut candidates, language).await;
    candidates.truncate(cap);
    candidates
}

/// Resolve a link against the base URL; `None` for fragment/mailto/tel links
/// and anything leaving the domain or its subdomains.
fn resolve_same_domain(base: &Url, href: &str) -> Option<String> {
    let lowered = href.to_lowercase();
    if lowered.starts_with('#')
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("javascript:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    let base_host = strip_www(base.host_str()?);
    let host = strip_www(resolved.host_str()?);
    let same = host == base_host
        || host.ends_with(&format!(".{}", base_host))
        || base_host.ends_with(&format!(".{}", host));
    if !same {
        return None;
    }

    let mut url = resolved;
    url.set_fragment(None);
    Some(url.to_string())
}

fn strip_www(host: &str) -> String {
    host.trim_start_matches("www.").to_lowercase()
}

/// Move corporate-identity subdomains (company./about./corporate., matched
/// directly or after translation) to the front as bare-root URLs.
async fn promote_corporate_subdomains<L>(candidates: &mut Vec<String>, language: &L)
where
    L: LanguageService + ?Sized,
{
    let mut promoted: Vec<String> = Vec::new();

    for candidate in candidates.iter() {
        let Ok(url) = Url::parse(candidate) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < 3 || labels[0] == "www" {
            continue;
        }

        let token = labels[0].to_lowercase();
        let mut is_corporate = CORPORATE_TOKENS.contains(&token.as_str());
        if !is_corporate {
            let translated = language.translate(&token, None).await.to_lowercase();
            is_corporate = CORPORATE_TOKENS.iter().any(|t| translated.contains(t));
        }

        if is_corporate {
            let root = format!("{}://{}/", url.scheme(), host);
            if !promoted.contains(&root) {
                tracing::debug!(host, "corporate subdomain promoted");
                promoted.push(root);
            }
        }
    }

    for root in promoted.into_iter().rev() {
        candidates.retain(|c| *c != root);
        candidates.insert(0, root);
    }
}
