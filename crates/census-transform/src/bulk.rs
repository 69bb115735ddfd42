//! Operator bulk fixes.

use census_model::{CanonicalField, Issue, ValueMappings, normalize_value_key};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BulkFixError;

/// One `(field, source, target)` rewrite chosen by an operator.
///
/// `source` is held as a lookup key (trimmed, case-folded) and `target` as
/// the value that will be written (trimmed, upper-cased for code fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFix {
    field: CanonicalField,
    source: String,
    target: String,
}

impl BulkFix {
    pub fn new(field: CanonicalField, source: &str, target: &str) -> Result<Self, BulkFixError> {
        let source = normalize_value_key(source);
        if source.is_empty() {
            return Err(BulkFixError::EmptySource {
                field: field.id().to_string(),
            });
        }
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(BulkFixError::EmptyTarget {
                field: field.id().to_string(),
            });
        }
        let target = if field.is_code_field() {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        };
        Ok(Self {
            field,
            source,
            target,
        })
    }

    pub fn field(&self) -> CanonicalField {
        self.field
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether `issue` is for this field and its raw value normalizes to `source`.
    pub fn matches(&self, issue: &Issue) -> bool {
        issue.field == self.field.id()
            && issue
                .value
                .as_deref()
                .is_some_and(|value| normalize_value_key(value) == self.source)
    }

    /// Record the rewrite so later runs apply it.
    pub fn record(&self, mappings: &mut ValueMappings) {
        mappings.insert(self.field, &self.source, &self.target);
    }

    /// Set `mapped_value` on every matching issue; returns how many were touched.
    pub fn apply_to_issues(&self, issues: &mut [Issue]) -> usize {
        let mut touched = 0;
        for issue in issues.iter_mut().filter(|issue| self.matches(issue)) {
            issue.mapped_value = Some(self.target.clone());
            touched += 1;
        }
        debug!(field = self.field.id(), touched, "bulk fix applied to issues");
        touched
    }
}
