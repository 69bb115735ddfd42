//! Standardized census export.

use serde::Serialize;
use sha2::{Digest, Sha256};

use census_ingest::{IngestError, write_standardized_csv};
use census_model::QuoteId;
use census_validate::ValidationReport;

/// Hex digits of the content hash kept in the file name.
const DIGEST_PREFIX: usize = 12;

/// Canonical columns and rows handed to downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandardizedCensus {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StandardizedCensus {
    pub fn from_report(report: &ValidationReport) -> Self {
        Self {
            columns: ValidationReport::columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            rows: report.rows.clone(),
        }
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, IngestError> {
        let headers: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        write_standardized_csv(&headers, &self.rows)
    }
}

/// `census_<quote>_<sha256 prefix>.csv`
pub fn artifact_name(quote: &QuoteId, bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    format!("census_{quote}_{}.csv", &digest[..DIGEST_PREFIX])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_depends_on_content() {
        let quote = QuoteId::new("Q-1").unwrap();
        let a = artifact_name(&quote, b"first_name\nJane\n");
        let b = artifact_name(&quote, b"first_name\nJohn\n");
        assert!(a.starts_with("census_Q-1_"));
        assert!(a.ends_with(".csv"));
        assert_eq!(a.len(), "census_Q-1_".len() + DIGEST_PREFIX + ".csv".len());
        assert_ne!(a, b);
        assert_eq!(a, artifact_name(&quote, b"first_name\nJane\n"));
    }

    #[test]
    fn csv_has_canonical_header() {
        let report = ValidationReport {
            issues: Vec::new(),
            rows: vec![vec![
                "Jane".to_string(),
                "Doe".to_string(),
                "01/26/1968".to_string(),
                "63101".to_string(),
                "F".to_string(),
                "E".to_string(),
                "EE".to_string(),
            ]],
        };
        let csv = StandardizedCensus::from_report(&report).to_csv().unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "first_name,last_name,dob,zip,gender,relationship,enrollment_tier\n\
             Jane,Doe,01/26/1968,63101,F,E,EE\n"
        );
    }
}
