//! Issue ledger and its read projections.
//!
//! The ledger is the single store of outstanding issues. The one-at-a-time fix
//! queue and the grouped triage view are both computed from it on demand.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use census_model::{CanonicalField, Issue};
use census_transform::BulkFix;

use crate::error::{CensusError, Result};

/// Outstanding issues of the latest pass, in validator order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueLedger(Vec<Issue>);

/// Operator edit of one issue. `None` leaves the attribute unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEdit {
    pub row: Option<usize>,
    pub field: Option<CanonicalField>,
    pub value: Option<String>,
    pub mapped_value: Option<String>,
}

/// One entry of the fix queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    /// Position in the ledger, used to address edits.
    pub index: usize,
    /// False once the issue carries a correction.
    pub pending: bool,
    pub issue: Issue,
}

/// Issues sharing a field and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueGroup {
    pub field: String,
    pub issue: String,
    /// Ledger positions, in ledger order.
    pub indices: Vec<usize>,
    /// Distinct raw values in first-seen order.
    pub values: Vec<String>,
}

impl IssueGroup {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl IssueLedger {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self(issues)
    }

    /// Supersede the whole ledger with the output of a fresh pass.
    pub fn replace(&mut self, issues: Vec<Issue>) {
        self.0 = issues;
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn issues(&self) -> &[Issue] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Issue> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply an operator edit in place. Nothing is re-validated.
    pub fn edit(&mut self, index: usize, edit: &IssueEdit) -> Result<&Issue> {
        let len = self.0.len();
        let issue = self
            .0
            .get_mut(index)
            .ok_or(CensusError::IssueNotFound { index, len })?;
        if let Some(row) = edit.row {
            issue.row = row;
        }
        if let Some(field) = edit.field {
            issue.field = field.id().to_string();
        }
        if let Some(value) = &edit.value {
            issue.value = Some(value.clone()).filter(|v| !v.trim().is_empty());
        }
        if let Some(mapped_value) = &edit.mapped_value {
            issue.mapped_value = Some(mapped_value.trim().to_string()).filter(|v| !v.is_empty());
        }
        Ok(issue)
    }

    /// Set the fix's target on every matching issue. Linear in ledger size.
    pub fn apply_bulk_fix(&mut self, fix: &BulkFix) -> usize {
        fix.apply_to_issues(&mut self.0)
    }

    /// Every issue in validator order, tagged with its ledger index.
    pub fn fix_queue(&self) -> Vec<QueueEntry> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, issue)| QueueEntry {
                index,
                pending: issue.is_pending(),
                issue: issue.clone(),
            })
            .collect()
    }

    /// The next issue still waiting for a correction.
    pub fn next_pending(&self) -> Option<QueueEntry> {
        self.fix_queue().into_iter().find(|entry| entry.pending)
    }

    /// Issues grouped by `(field, issue text)`, largest group first.
    ///
    /// Groups of equal size keep the order in which they first appear.
    pub fn grouped(&self) -> Vec<IssueGroup> {
        let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
        let mut groups: Vec<IssueGroup> = Vec::new();
        for (index, issue) in self.0.iter().enumerate() {
            let key = (issue.field.as_str(), issue.issue.as_str());
            let slot = *positions.entry(key).or_insert_with(|| {
                groups.push(IssueGroup {
                    field: issue.field.clone(),
                    issue: issue.issue.clone(),
                    indices: Vec::new(),
                    values: Vec::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.indices.push(index);
            if let Some(value) = &issue.value
                && !group.values.contains(value)
            {
                group.values.push(value.clone());
            }
        }
        // Stable sort keeps first-appearance order among equal sizes.
        groups.sort_by(|a, b| b.len().cmp(&a.len()));
        debug!(groups = groups.len(), issues = self.0.len(), "issue ledger grouped");
        groups
    }
}
