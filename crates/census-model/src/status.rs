use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{RunStatus, StandardizationRun};

/// Where a quote's census sits in the standardization workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensusStatus {
    /// No standardization run exists yet.
    #[default]
    Unvalidated,
    /// A pass is in flight.
    Validating,
    /// The latest run has no issues.
    Complete,
    /// The latest run has outstanding issues.
    NeedsReview,
}

impl CensusStatus {
    /// Status implied by the latest run, if any.
    pub fn from_run(run: Option<&StandardizationRun>) -> Self {
        match run.map(StandardizationRun::status) {
            None => Self::Unvalidated,
            Some(RunStatus::Complete) => Self::Complete,
            Some(RunStatus::NeedsReview) => Self::NeedsReview,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unvalidated => "Unvalidated",
            Self::Validating => "Validating",
            Self::Complete => "Complete",
            Self::NeedsReview => "Needs Review",
        }
    }
}

impl fmt::Display for CensusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
