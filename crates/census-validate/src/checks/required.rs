//! Presence check shared by every field.

use super::Finding;
use crate::issue::IssueKind;

pub(super) fn check(value: &str) -> Option<Finding> {
    value
        .trim()
        .is_empty()
        .then(|| Finding::new(IssueKind::MissingValue))
}
