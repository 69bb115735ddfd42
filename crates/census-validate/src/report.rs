//! Validation report for one census pass.

use census_model::{CanonicalField, Issue, RunStatus};
use serde::Serialize;

/// Issues plus the standardized rows the pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Ordered by row (aggregate issues first), then field catalog order.
    pub issues: Vec<Issue>,
    /// One row per census row, one cell per canonical field in catalog order.
    /// Unmapped fields are empty.
    pub rows: Vec<Vec<String>>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::for_issues(&self.issues)
    }

    /// Column headers for [`rows`](Self::rows).
    pub fn columns() -> Vec<&'static str> {
        CanonicalField::ALL.into_iter().map(CanonicalField::id).collect()
    }

    /// Issues for one field, in report order.
    pub fn issues_for(&self, field: CanonicalField) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.field == field.id())
    }
}
