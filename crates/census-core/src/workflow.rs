//! Census workflow state machine.
//!
//! ```text
//! Unvalidated ─┐
//! Complete ────┼─ Validate ─> Validating ─ Finished ─> Complete | NeedsReview
//! NeedsReview ─┘
//! any ─ Reset ─> Unvalidated
//! ```
//!
//! Bulk fixes without a re-run and direct issue edits do not move the state.

use std::fmt;

use census_model::CensusStatus;

use crate::error::{CensusError, Result};

/// Something that happens to a census.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// A standardization pass starts.
    Validate,
    /// The pass finished; `clean` when it produced no issues.
    Finished { clean: bool },
    /// Every census upload was removed.
    Reset,
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => f.write_str("validate"),
            Self::Finished { clean: true } => f.write_str("finished (clean)"),
            Self::Finished { clean: false } => f.write_str("finished (issues)"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

/// Next status for `event`, or an error for an illegal move.
pub fn transition(from: CensusStatus, event: WorkflowEvent) -> Result<CensusStatus> {
    use CensusStatus::{Complete, NeedsReview, Unvalidated, Validating};

    let next = match (from, event) {
        (_, WorkflowEvent::Reset) => Some(Unvalidated),
        (Unvalidated | Complete | NeedsReview, WorkflowEvent::Validate) => Some(Validating),
        (Validating, WorkflowEvent::Finished { clean: true }) => Some(Complete),
        (Validating, WorkflowEvent::Finished { clean: false }) => Some(NeedsReview),
        _ => None,
    };
    next.ok_or_else(|| CensusError::IllegalTransition {
        from,
        event: event.to_string(),
    })
}
