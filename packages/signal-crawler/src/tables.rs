//! Reference data shared read-only by all extractors.
//!
//! Everything has a compiled-in default; a data directory with flat label
//! files (`industry.csv`, `regions.csv`, `headcount.csv`, `size.csv`) can
//! override the corresponding list. Loaded once before crawling, never
//! mutated during a run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// One industry category: ordered keywords plus phrases that must never
/// count toward it (cross-domain false positives).
#[derive(Debug, Clone)]
pub struct IndustryProfile {
    pub label: String,
    pub keywords: Vec<String>,
    pub exclusions: Vec<String>,
}

impl IndustryProfile {
    fn new(label: &str, keywords: &[&str], exclusions: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            exclusions: exclusions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Inclusive employee-count range with its display label.
#[derive(Debug, Clone)]
pub struct HeadcountBucket {
    pub label: String,
    pub min: u32,
    pub max: Option<u32>,
}

impl HeadcountBucket {
    fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Parse a flat label like `1-9`, `over 5000`, or `5000+`.
    fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if let Some(rest) = trimmed.strip_prefix("over ") {
            let min: u32 = rest.trim().parse().ok()?;
            return Some(Self {
                label: trimmed.to_string(),
                min: min + 1,
                max: None,
            });
        }
        if let Some(rest) = trimmed.strip_suffix('+') {
            let min: u32 = rest.trim().parse().ok()?;
            return Some(Self {
                label: trimmed.to_string(),
                min: min + 1,
                max: None,
            });
        }
        let (lo, hi) = trimmed.split_once('-')?;
        Some(Self {
            label: trimmed.to_string(),
            min: lo.trim().parse().ok()?,
            max: Some(hi.trim().parse().ok()?),
        })
    }
}

/// Process-wide reference tables: industry keywords, region maps, headcount
/// buckets, and the bucket-to-size mapping.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Declaration order breaks industry-score ties, so this stays a Vec.
    pub industries: Vec<IndustryProfile>,
    pub domain_regions: Vec<(String, String)>,
    pub country_regions: Vec<(String, String)>,
    pub buckets: Vec<HeadcountBucket>,
    pub size_map: Vec<(String, String)>,
    pub regions: Vec<String>,
    pub size_categories: Vec<String>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            industries: default_industries(),
            domain_regions: pairs(&[
                (".nl", "BeNeLux"),
                (".be", "BeNeLux"),
                (".lu", "BeNeLux"),
                (".de", "DACH"),
                (".at", "DACH"),
                (".ch", "DACH"),
                (".es", "ES"),
                (".fr", "FR"),
                (".uk", "UKI"),
                (".ie", "UKI"),
                (".pl", "EU"),
            ]),
            country_regions: pairs(&[
                ("netherlands", "BeNeLux"),
                ("nederland", "BeNeLux"),
                ("holland", "BeNeLux"),
                ("belgium", "BeNeLux"),
                ("belgië", "BeNeLux"),
                ("belgique", "BeNeLux"),
                ("luxembourg", "BeNeLux"),
                ("germany", "DACH"),
                ("deutschland", "DACH"),
                ("austria", "DACH"),
                ("österreich", "DACH"),
                ("switzerland", "DACH"),
                ("schweiz", "DACH"),
                ("suisse", "DACH"),
                ("spain", "ES"),
                ("españa", "ES"),
                ("france", "FR"),
                ("français", "FR"),
                ("united kingdom", "UKI"),
                ("britain", "UKI"),
                ("england", "UKI"),
                ("ireland", "UKI"),
            ]),
            buckets: default_buckets(),
            size_map: pairs(&[
                ("1-9", "Very Small Business"),
                ("10-50", "Very Small Business"),
                ("51-100", "Small Business"),
                ("101-200", "Small Business"),
                ("201-500", "Mid-Market"),
                ("501-1000", "Mid-Market"),
                ("1001-5000", "Enterprise"),
                ("5000+", "Enterprise"),
            ]),
            regions: vec![
                "BeNeLux".into(),
                "DACH".into(),
                "ES".into(),
                "FR".into(),
                "UKI".into(),
                "EU".into(),
            ],
            size_categories: vec![
                "Very Small Business".into(),
                "Small Business".into(),
                "Mid-Market".into(),
                "Enterprise".into(),
            ],
        }
    }
}

impl ReferenceTables {
    /// Defaults, with any flat label file in `dir` overriding its list.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut tables = Self::default();

        if let Some(labels) = read_labels(&dir.join("industry.csv"))? {
            // Known labels keep their keyword profile; unknown labels get an
            // empty one so they can still appear in outputs.
            let defaults = default_industries();
            tables.industries = labels
                .into_iter()
                .map(|label| {
                    defaults
                        .iter()
                        .find(|p| p.label == label)
                        .cloned()
                        .unwrap_or_else(|| IndustryProfile::new(&label, &[], &[]))
                })
                .collect();
            tracing::info!(count = tables.industries.len(), "industry labels overridden");
        }

        if let Some(labels) = read_labels(&dir.join("regions.csv"))? {
            tables.regions = labels;
        }

        if let Some(labels) = read_labels(&dir.join("headcount.csv"))? {
            let buckets: Vec<HeadcountBucket> = labels
                .iter()
                .filter_map(|label| HeadcountBucket::parse(label))
                .collect();
            if buckets.len() != labels.len() {
                tracing::warn!("some headcount labels could not be parsed, keeping defaults");
            } else {
                tables.buckets = buckets;
            }
        }

        if let Some(labels) = read_labels(&dir.join("size.csv"))? {
            tables.size_categories = labels;
        }

        tracing::info!(
            industries = tables.industries.len(),
            regions = tables.regions.len(),
            buckets = tables.buckets.len(),
            "reference tables loaded"
        );
        Ok(tables)
    }

    /// Inclusive-range bucket lookup for an employee count.
    pub fn bucket_for(&self, count: u32) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.contains(count))
            .map(|b| b.label.as_str())
    }

    /// Size category for a bucket label. Pure function of the range: `None`
    /// or an unrecognized label always maps to `Unknown`.
    pub fn size_for_range(&self, range: Option<&str>) -> String {
        range
            .and_then(|label| {
                self.size_map
                    .iter()
                    .find(|(bucket, _)| bucket == label)
                    .map(|(_, size)| size.clone())
            })
            .unwrap_or_else(|| crate::types::UNKNOWN_SIZE.to_string())
    }

    pub fn region_for_extension(&self, domain: &str) -> Option<(&str, &str)> {
        let lowered = domain.to_lowercase();
        self.domain_regions
            .iter()
            .find(|(ext, _)| lowered.ends_with(ext.as_str()))
            .map(|(ext, region)| (ext.as_str(), region.as_str()))
    }

    pub fn region_for_country_mention(&self, text: &str) -> Option<(&str, &str)> {
        self.country_regions
            .iter()
            .find(|(country, _)| text.contains(country.as_str()))
            .map(|(country, region)| (country.as_str(), region.as_str()))
    }
}

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// One label per line, blank lines skipped. `Ok(None)` when the file is
/// absent, so the caller keeps its compiled defaults.
fn read_labels(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    Ok(Some(labels))
}

fn default_buckets() -> Vec<HeadcountBucket> {
    ["1-9", "10-50", "51-100", "101-200", "201-500", "501-1000", "1001-5000", "5000+"]
        .iter()
        .filter_map(|label| HeadcountBucket::parse(label))
        .collect()
}

fn default_industries() -> Vec<IndustryProfile> {
    vec![
        IndustryProfile::new(
            "Business Services",
            &[
                "consulting", "consulting firm", "consultancy", "advisory",
                "professional services",
                "outsourcing", "business process", "audit", "accounting",
                "bookkeeping", "tax services", "legal services", "law firm",
                "compliance", "risk management", "recruitment", "staffing",
                "talent acquisition", "marketing agency", "advertising agency",
                "public relations", "branding agency", "creative agency",
            ],
            &[],
        ),
        IndustryProfile::new(
            "Financial Services (excl. Fintech)",
            &[
                "bank", "banking", "investment bank", "asset management",
                "wealth management", "fund management", "insurance company",
                "life insurance", "pension fund", "investment fund",
                "mutual fund", "hedge fund", "private equity", "venture capital",
                "credit union", "mortgage lender", "brokerage", "securities",
                "capital markets",
            ],
            &["blood bank", "food bank", "river bank"],
        ),
        IndustryProfile::new(
            "Healthcare, Pharmaceuticals, & Biotech",
            &[
                "hospital", "clinic", "medical center", "healthcare provider",
                "pharmaceutical", "pharma", "drug development", "biotech",
                "biotechnology", "life sciences", "medical device", "diagnostic",
                "clinical research", "patient care", "dental practice",
                "veterinary", "veterinarian", "animal hospital", "animal health",
                "dierenarts", "dierenkliniek", "veterinair",
            ],
            &["healthcare software"],
        ),
        IndustryProfile::new(
            "Manufacturing (incl. Food & Drink)",
            &[
                "manufacturing", "factory", "production facility", "industrial",
                "machinery", "equipment manufacturer", "automotive", "chemical",
                "steel", "metal", "plastic", "semiconductor", "food production",
                "beverage", "brewery", "distillery", "food manufacturer",
                "packaging",
            ],
            &[],
        ),
        IndustryProfile::new(
            "Real Estate and Construction",
            &[
                "real estate", "property development", "construction company",
                "architecture", "residential development", "commercial development",
                "infrastructure", "contractor", "renovation", "surveying",
                "facilities management", "property management",
            ],
            &[],
        ),
        IndustryProfile::new(
            "Retail (incl. Restaurants)",
            &[
                "retail store", "e-commerce", "ecommerce", "marketplace",
                "fashion retailer", "clothing store", "apparel", "cosmetics",
                "consumer goods", "restaurant", "cafe", "hospitality", "hotel",
                "travel agency", "tourism", "online store", "webshop",
                "boutique", "department store", "supermarket", "grocery",
                "retail chain", "shopping center",
            ],
            &[],
        ),
        IndustryProfile::new(
            "Software & Internet (incl. Video Games)",
            &[
                "software", "software company", "software development", "tech company",
                "technology company", "information technology", "digital agency",
                "web development", "app development", "saas", "cloud services",
                "data analytics", "artificial intelligence", "machine learning",
                "cybersecurity", "blockchain", "gaming company", "video game",
                "game development", "mobile app",
            ],
            &["healthcare software", "software manufacturer"],
        ),
        IndustryProfile::new(
            "Transportation and Storage",
            &[
                "transportation company", "transport", "logistics company",
                "shipping company", "delivery service", "freight", "cargo",
                "warehouse", "storage facility", "distribution center",
                "trucking company", "airline", "maritime", "fleet management",
            ],
            &[],
        ),
        IndustryProfile::new(
            "Aerospace & Defense",
            &[
                "aerospace", "aviation industry", "aircraft", "aviation services",
                "aerospace engineering", "flight operations", "aviation technology",
                "aviation safety", "flight training", "aviation consulting",
                "aircraft maintenance", "aviation management",
            ],
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries_are_inclusive_on_the_lower_bucket() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.bucket_for(9), Some("1-9"));
        assert_eq!(tables.bucket_for(10), Some("10-50"));
        assert_eq!(tables.bucket_for(50), Some("10-50"));
        assert_eq!(tables.bucket_for(5000), Some("1001-5000"));
        assert_eq!(tables.bucket_for(5001), Some("5000+"));
        assert_eq!(tables.bucket_for(0), None);
    }

    #[test]
    fn size_is_a_pure_function_of_range() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.size_for_range(Some("10-50")), "Very Small Business");
        assert_eq!(tables.size_for_range(Some("10-50")), "Very Small Business");
        assert_eq!(tables.size_for_range(Some("201-500")), "Mid-Market");
        assert_eq!(tables.size_for_range(None), "Unknown");
        assert_eq!(tables.size_for_range(Some("not-a-bucket")), "Unknown");
    }

    #[test]
    fn bucket_label_parsing_handles_open_ranges() {
        let over = HeadcountBucket::parse("over 5000").unwrap();
        assert_eq!(over.min, 5001);
        assert_eq!(over.max, None);

        let plus = HeadcountBucket::parse("5000+").unwrap();
        assert_eq!(plus.min, 5001);

        assert!(HeadcountBucket::parse("lots").is_none());
    }

    #[test]
    fn domain_extension_lookup_is_case_insensitive() {
        let tables = ReferenceTables::default();
        assert_eq!(
            tables.region_for_extension("Example.DE"),
            Some((".de", "DACH"))
        );
        assert_eq!(tables.region_for_extension("example.com"), None);
    }

    #[test]
    fn label_file_overrides_replace_defaults() {
        let dir = std::env::temp_dir().join("signal-crawler-tables-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("headcount.csv"), "1-49\n50-249\n250+\n").unwrap();

        let tables = ReferenceTables::load(&dir).unwrap();
        assert_eq!(tables.bucket_for(49), Some("1-49"));
        assert_eq!(tables.bucket_for(50), Some("50-249"));
        assert_eq!(tables.bucket_for(300), Some("250+"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
