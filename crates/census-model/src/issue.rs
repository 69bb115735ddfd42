//! Data-quality issues raised against a census.

use serde::{Deserialize, Serialize};

use crate::CanonicalField;

/// Field label of issues about the census as a whole rather than one column.
pub const CENSUS_WIDE_FIELD: &str = "census";

/// A single data-quality finding.
///
/// Issues are displayed by `(row, field)` but that pair is not unique: a row
/// may carry several issues for the same field. Row `0` marks an aggregate
/// issue that applies to the whole census (e.g. a missing column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-based data row number, or 0 for census-wide issues.
    pub row: usize,
    /// Canonical field identifier.
    pub field: String,
    /// Human-readable description.
    pub issue: String,
    /// Raw observed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Correction, either suggested by the validator or supplied by an operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_value: Option<String>,
}

impl Issue {
    pub fn new(row: usize, field: CanonicalField, issue: impl Into<String>) -> Self {
        Self {
            row,
            field: field.id().to_string(),
            issue: issue.into(),
            value: None,
            mapped_value: None,
        }
    }

    /// Row-0 issue that no canonical field owns.
    pub fn census_wide(issue: impl Into<String>) -> Self {
        Self {
            row: 0,
            field: CENSUS_WIDE_FIELD.to_string(),
            issue: issue.into(),
            value: None,
            mapped_value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_mapped_value(mut self, mapped_value: Option<String>) -> Self {
        self.mapped_value = mapped_value.filter(|value| !value.trim().is_empty());
        self
    }

    /// Census-wide issues have no row to correct.
    pub fn is_aggregate(&self) -> bool {
        self.row == 0
    }

    pub fn canonical_field(&self) -> Option<CanonicalField> {
        CanonicalField::parse(&self.field)
    }

    /// Still waiting for a correction.
    pub fn is_pending(&self) -> bool {
        self.mapped_value
            .as_deref()
            .is_none_or(|value| value.trim().is_empty())
    }

    /// The value an operator wants written back to the cell, if any.
    ///
    /// A non-empty `mapped_value` wins; otherwise an edited non-empty `value`
    /// is taken as the correction.
    pub fn correction(&self) -> Option<&str> {
        fn pick(candidate: &Option<String>) -> Option<&str> {
            candidate
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
        }
        pick(&self.mapped_value).or_else(|| pick(&self.value))
    }
}
