//! The three independent signal extractors. Each is a pure function over
//! normalized text plus metadata; none of them does I/O.

pub mod employees;
pub mod industry;
pub mod region;

pub use employees::{extract_employees, ExtractionMatch};
pub use industry::{extract_industry, TextSource, WEIGHT_BODY, WEIGHT_COMPANY_NAME, WEIGHT_TRANSLATED};
pub use region::extract_region;
