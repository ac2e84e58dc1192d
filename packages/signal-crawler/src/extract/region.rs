//! Region extraction: domain extension first, country mention second,
//! configured fallback last. First hit wins, tiers are never aggregated.

use crate::tables::ReferenceTables;
use crate::types::{RegionSignal, RegionTier};

pub fn extract_region(
    normalized_text: &str,
    domain: &str,
    tables: &ReferenceTables,
    fallback: &str,
) -> RegionSignal {
    if let Some((ext, region)) = tables.region_for_extension(domain) {
        return RegionSignal {
            region: region.to_string(),
            tier: RegionTier::DomainExtension,
            reasoning: vec![format!(
                "domain extension {} indicates {} (high confidence)",
                ext, region
            )],
        };
    }

    if let Some((country, region)) = tables.region_for_country_mention(normalized_text) {
        return RegionSignal {
            region: region.to_string(),
            tier: RegionTier::CountryMention,
            reasoning: vec![format!(
                "country mention '{}' indicates {} (medium confidence)",
                country, region
            )],
        };
    }

    RegionSignal {
        region: fallback.to_string(),
        tier: RegionTier::Fallback,
        reasoning: vec![format!("default region {}, no signal found", fallback)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_extension_beats_country_mention() {
        let tables = ReferenceTables::default();
        let signal = extract_region("our offices in france", "example.de", &tables, "EU");
        assert_eq!(signal.region, "DACH");
        assert_eq!(signal.tier, RegionTier::DomainExtension);
        assert!(signal.reasoning[0].contains("high confidence"));
    }

    #[test]
    fn country_mention_is_second_tier() {
        let tables = ReferenceTables::default();
        let signal = extract_region(
            "we serve clients across france and beyond",
            "example.com",
            &tables,
            "EU",
        );
        assert_eq!(signal.region, "FR");
        assert_eq!(signal.tier, RegionTier::CountryMention);
    }

    #[test]
    fn fallback_is_labeled_as_default() {
        let tables = ReferenceTables::default();
        let signal = extract_region("nothing locational here", "example.com", &tables, "EU");
        assert_eq!(signal.region, "EU");
        assert_eq!(signal.tier, RegionTier::Fallback);
        assert!(signal.reasoning[0].contains("no signal found"));
    }

    #[test]
    fn polish_domain_maps_to_eu_but_counts_as_evidence() {
        let tables = ReferenceTables::default();
        let signal = extract_region("", "firma.pl", &tables, "EU");
        assert_eq!(signal.region, "EU");
        assert_eq!(signal.tier, RegionTier::DomainExtension);
    }
}
