//! Validation check modules.
//!
//! Each module judges one rule family. [`check_value`] dispatches on the
//! catalog rule so a field's behavior follows its catalog entry.

pub mod codes;
pub mod dates;
mod required;
pub mod zip;

use census_standards::{FieldSpec, RuleKind};

use crate::issue::IssueKind;

/// A failed check plus the correction it would suggest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: IssueKind,
    pub suggestion: Option<String>,
}

impl Finding {
    fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

/// Judge one normalized cell value against `spec`'s rule.
pub fn check_value(spec: &FieldSpec, value: &str) -> Option<Finding> {
    if let Some(finding) = required::check(value) {
        return Some(finding);
    }
    match spec.rule.kind {
        RuleKind::Required => None,
        RuleKind::Date => dates::check(value),
        RuleKind::Zip => zip::check(value),
        RuleKind::CodeSet => codes::check(spec, value),
    }
}

/// The value written to the standardized export for a cell that passed.
pub fn canonical_value(spec: &FieldSpec, value: &str) -> String {
    match spec.rule.kind {
        RuleKind::Date => dates::parse_dob(value)
            .map(dates::format_dob)
            .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
    }
}
