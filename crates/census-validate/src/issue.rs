//! Validation issue kinds.
//!
//! Each variant carries only the data its message needs. Kinds are turned
//! into ledger [`Issue`]s once the row and observed value are known.

use census_model::{CanonicalField, Issue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// No header is mapped to the field.
    MissingColumn,
    /// The cell is empty after trimming.
    MissingValue,
    /// Not a calendar date in an accepted layout.
    InvalidDate,
    /// Not exactly five digits.
    InvalidZip,
    /// Not one of the field's codes.
    InvalidCode { label: String, codes: Vec<String> },
    /// The census has a header row but no data rows.
    NoRows,
    /// Rule evaluation itself failed; the census cannot be trusted.
    Fault { detail: String },
}

impl IssueKind {
    pub fn message(&self) -> String {
        match self {
            Self::MissingColumn => "Missing required column".to_string(),
            Self::MissingValue => "Missing value".to_string(),
            Self::InvalidDate => {
                "Invalid date (expected MM/DD/YYYY or YYYY-MM-DD)".to_string()
            }
            Self::InvalidZip => "Zip code must be exactly 5 digits".to_string(),
            Self::InvalidCode { label, codes } => {
                format!("{label} must be one of: {}", codes.join(", "))
            }
            Self::NoRows => "Census has no data rows".to_string(),
            Self::Fault { detail } => format!("Validation could not complete: {detail}"),
        }
    }

    /// Build the ledger issue for `row` (0 for census-wide kinds).
    pub fn into_issue(
        self,
        row: usize,
        field: CanonicalField,
        value: Option<&str>,
        suggestion: Option<String>,
    ) -> Issue {
        let mut issue = Issue::new(row, field, self.message()).with_mapped_value(suggestion);
        if let Some(value) = value {
            issue = issue.with_value(value);
        }
        issue
    }

    /// Build a row-0 issue that belongs to no single field.
    pub fn into_census_issue(self) -> Issue {
        Issue::census_wide(self.message())
    }
}
