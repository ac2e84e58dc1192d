//! Company-list input and result CSV output.
//!
//! Input lists are semicolon-separated `Company;Domain` rows, with an
//! optional header. Output is one row per crawled company, reasoning steps
//! joined into a single cell.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{CompanyRecord, CrawlResult};

const OUTPUT_HEADERS: &[&str] = &[
    "company_name",
    "domain",
    "url",
    "http_status",
    "detected_language",
    "translated",
    "employee_count",
    "employee_count_range",
    "region",
    "industry",
    "size_category",
    "reasoning",
    "scraped_at",
    "error",
];

// ============================================================================
// INPUT
// ============================================================================

/// Load a semicolon-separated company list. A first row mentioning "company"
/// or "domain" is treated as a header; rows without both fields are skipped.
pub fn load_company_list(path: &Path) -> Result<Vec<CompanyRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening company list {}", path.display()))?;
    read_company_list(file)
}

pub fn read_company_list(reader: impl Read) -> Result<Vec<CompanyRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut companies = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row.context("reading company list row")?;
        let name = row.get(0).unwrap_or("").trim();
        let domain = row.get(1).unwrap_or("").trim();

        if index == 0 {
            let lowered = format!("{} {}", name.to_lowercase(), domain.to_lowercase());
            if lowered.contains("company") || lowered.contains("domain") {
                continue;
            }
        }
        if name.is_empty() || domain.is_empty() {
            if !(name.is_empty() && domain.is_empty()) {
                tracing::warn!(row = index + 1, "skipping incomplete company row");
            }
            continue;
        }
        companies.push(CompanyRecord::new(name, domain));
    }
    Ok(companies)
}

// ============================================================================
// OUTPUT
// ============================================================================

pub fn write_results(path: &Path, results: &[CrawlResult]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    write_results_to(file, results)
}

pub fn write_results_to(writer: impl Write, results: &[CrawlResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(OUTPUT_HEADERS)
        .context("writing output header")?;

    for result in results {
        let row = [
            result.company_name.clone(),
            result.domain.clone(),
            result.url.clone(),
            result.http_status.map(|s| s.to_string()).unwrap_or_default(),
            result.detected_language.clone().unwrap_or_default(),
            result.translated.to_string(),
            result
                .employee_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            result.employee_count_range.clone().unwrap_or_default(),
            result.region.clone(),
            result.industry.clone(),
            result.size_category.clone(),
            result.reasoning.join("; "),
            result.scraped_at.to_rfc3339(),
            result.error.clone().unwrap_or_default(),
        ];
        csv_writer.write_record(&row).context("writing result row")?;
    }
    csv_writer.flush().context("flushing output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped_and_blank_rows_ignored() {
        let input = "Company;Domain\nAcme GmbH;acme.de\n\nBroken row\nBeta BV;beta.nl\n";
        let companies = read_company_list(input.as_bytes()).unwrap();
        assert_eq!(
            companies,
            vec![
                CompanyRecord::new("Acme GmbH", "acme.de"),
                CompanyRecord::new("Beta BV", "beta.nl"),
            ]
        );
    }

    #[test]
    fn headerless_lists_keep_the_first_row() {
        let input = "Acme GmbH;acme.de\nBeta BV;beta.nl\n";
        let companies = read_company_list(input.as_bytes()).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].name, "Acme GmbH");
    }

    #[test]
    fn output_has_one_row_per_result_with_joined_reasoning() {
        let company = CompanyRecord::new("Acme", "acme.de");
        let mut result = CrawlResult::empty(&company, "EU");
        result.url = "https://acme.de".to_string();
        result.http_status = Some(200);
        result.employee_count = Some(45);
        result.employee_count_range = Some("10-50".to_string());
        result.reasoning = vec!["first step".to_string(), "second step".to_string()];

        let mut buffer = Vec::new();
        write_results_to(&mut buffer, &[result]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("company_name,domain,url"));
        let row = lines.next().unwrap();
        assert!(row.contains("first step; second step"));
        assert!(row.contains("10-50"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn failed_results_serialize_their_error() {
        let company = CompanyRecord::new("Ghost", "gone.example");
        let result =
            CrawlResult::from_fetch_failure(&company, "https://gone.example", "EU", "refused");

        let mut buffer = Vec::new();
        write_results_to(&mut buffer, &[result]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("refused"));
    }
}
