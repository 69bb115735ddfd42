//! Submission gate.

use serde::Serialize;

use crate::error::CensusError;
use crate::ledger::IssueLedger;

/// Why a quote may not be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateBlock {
    NoCensus,
    UnresolvedIssues { remaining: usize },
}

impl GateBlock {
    pub fn into_error(self, quote: &str) -> CensusError {
        match self {
            Self::NoCensus => CensusError::NoCensus {
                quote: quote.to_string(),
            },
            Self::UnresolvedIssues { remaining } => CensusError::UnresolvedIssues { remaining },
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Allowed,
    Blocked(GateBlock),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> Option<GateBlock> {
        match self {
            Self::Allowed => None,
            Self::Blocked(block) => Some(*block),
        }
    }
}

/// Gate rules without the resolve pass: census first, then the ledger.
///
/// The engine runs one resolve-and-revalidate pass between a non-empty ledger
/// and this check, and calls it again on the ledger that pass left behind.
pub fn evaluate(has_census: bool, ledger: &IssueLedger) -> GateDecision {
    if !has_census {
        return GateDecision::Blocked(GateBlock::NoCensus);
    }
    if !ledger.is_empty() {
        return GateDecision::Blocked(GateBlock::UnresolvedIssues {
            remaining: ledger.len(),
        });
    }
    GateDecision::Allowed
}

#[cfg(test)]
mod tests {
    use census_model::{CanonicalField, Issue};

    use super::*;

    #[test]
    fn missing_census_wins_over_issues() {
        let ledger = IssueLedger::new(vec![Issue::new(1, CanonicalField::Zip, "bad")]);
        assert_eq!(
            evaluate(false, &ledger),
            GateDecision::Blocked(GateBlock::NoCensus)
        );
    }

    #[test]
    fn any_issue_blocks() {
        let ledger = IssueLedger::new(vec![Issue::new(1, CanonicalField::Zip, "bad")]);
        let decision = evaluate(true, &ledger);
        assert!(!decision.is_allowed());
        assert_eq!(
            decision.reason(),
            Some(GateBlock::UnresolvedIssues { remaining: 1 })
        );
        assert!(evaluate(true, &IssueLedger::default()).is_allowed());
    }

    #[test]
    fn decision_serializes_with_reason() {
        let json = serde_json::to_string(&GateDecision::Blocked(GateBlock::UnresolvedIssues {
            remaining: 2,
        }))
        .unwrap();
        assert_eq!(
            json,
            r#"{"decision":"blocked","reason":"unresolved_issues","remaining":2}"#
        );
    }
}
