//! Standardization run records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HeaderMapping, Issue, ModelError};

/// Outcome of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// No outstanding issues.
    #[serde(rename = "Complete")]
    Complete,
    /// At least one issue needs operator attention.
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl RunStatus {
    /// The only way a status is derived: from the issue list of the pass.
    pub fn for_issues(issues: &[Issue]) -> Self {
        if issues.is_empty() {
            Self::Complete
        } else {
            Self::NeedsReview
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::NeedsReview => "Needs Review",
        }
    }
}

/// A sample census row keyed by raw header.
pub type SampleRow = BTreeMap<String, String>;

/// Persisted snapshot of one standardization pass.
///
/// Runs are read-only once built. Status and counts are derived from the
/// issue list in [`StandardizationRun::new`] and re-checked on deserialization,
/// so a run can never claim `Complete` while carrying issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RunRecord")]
pub struct StandardizationRun {
    sequence: u64,
    status: RunStatus,
    issue_count: usize,
    issue_rows: usize,
    total_rows: usize,
    detected_headers: Vec<String>,
    header_mapping: HeaderMapping,
    sample_data: BTreeMap<String, Vec<String>>,
    sample_rows: Vec<SampleRow>,
    standardized_filename: Option<String>,
    catalog_version: String,
    created_at: DateTime<Utc>,
}

/// Inputs describing a finished pass, minus anything derived from issues.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub sequence: u64,
    pub total_rows: usize,
    pub detected_headers: Vec<String>,
    pub header_mapping: HeaderMapping,
    pub sample_data: BTreeMap<String, Vec<String>>,
    pub sample_rows: Vec<SampleRow>,
    pub standardized_filename: Option<String>,
    pub catalog_version: String,
}

impl StandardizationRun {
    pub fn new(inputs: RunInputs, issues: &[Issue], created_at: DateTime<Utc>) -> Self {
        let mut rows: Vec<usize> = issues
            .iter()
            .filter(|issue| !issue.is_aggregate())
            .map(|issue| issue.row)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        Self {
            sequence: inputs.sequence,
            status: RunStatus::for_issues(issues),
            issue_count: issues.len(),
            issue_rows: rows.len(),
            total_rows: inputs.total_rows,
            detected_headers: inputs.detected_headers,
            header_mapping: inputs.header_mapping,
            sample_data: inputs.sample_data,
            sample_rows: inputs.sample_rows,
            standardized_filename: inputs.standardized_filename,
            catalog_version: inputs.catalog_version,
            created_at,
        }
    }

    /// Monotonic per-quote run number, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    pub fn issue_count(&self) -> usize {
        self.issue_count
    }

    /// Distinct data rows with at least one issue.
    pub fn issue_rows(&self) -> usize {
        self.issue_rows
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn detected_headers(&self) -> &[String] {
        &self.detected_headers
    }

    /// The header mapping the pass validated against.
    pub fn header_mapping(&self) -> &HeaderMapping {
        &self.header_mapping
    }

    pub fn sample_data(&self) -> &BTreeMap<String, Vec<String>> {
        &self.sample_data
    }

    pub fn sample_rows(&self) -> &[SampleRow] {
        &self.sample_rows
    }

    pub fn standardized_filename(&self) -> Option<&str> {
        self.standardized_filename.as_deref()
    }

    pub fn catalog_version(&self) -> &str {
        &self.catalog_version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Deserialize)]
struct RunRecord {
    sequence: u64,
    status: RunStatus,
    issue_count: usize,
    issue_rows: usize,
    total_rows: usize,
    detected_headers: Vec<String>,
    #[serde(default)]
    header_mapping: HeaderMapping,
    #[serde(default)]
    sample_data: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    sample_rows: Vec<SampleRow>,
    #[serde(default)]
    standardized_filename: Option<String>,
    #[serde(default)]
    catalog_version: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RunRecord> for StandardizationRun {
    type Error = ModelError;

    fn try_from(record: RunRecord) -> Result<Self, Self::Error> {
        let expected = if record.issue_count == 0 {
            RunStatus::Complete
        } else {
            RunStatus::NeedsReview
        };
        if record.status != expected {
            return Err(ModelError::InconsistentRun(format!(
                "status '{}' with {} issues",
                record.status.label(),
                record.issue_count
            )));
        }
        if record.issue_rows > record.issue_count {
            return Err(ModelError::InconsistentRun(format!(
                "{} issue rows but only {} issues",
                record.issue_rows, record.issue_count
            )));
        }
        Ok(Self {
            sequence: record.sequence,
            status: record.status,
            issue_count: record.issue_count,
            issue_rows: record.issue_rows,
            total_rows: record.total_rows,
            detected_headers: record.detected_headers,
            header_mapping: record.header_mapping,
            sample_data: record.sample_data,
            sample_rows: record.sample_rows,
            standardized_filename: record.standardized_filename,
            catalog_version: record.catalog_version,
            created_at: record.created_at,
        })
    }
}
