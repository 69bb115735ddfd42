//! Zip code checks.

use super::Finding;
use crate::issue::IssueKind;

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

pub fn is_valid(value: &str) -> bool {
    value.len() == 5 && all_digits(value)
}

/// Five-digit form of a zip that lost leading zeros or carries a +4 suffix.
pub fn suggest(value: &str) -> Option<String> {
    let value = value.trim();
    if let Some((head, tail)) = value.split_once('-')
        && is_valid(head)
        && tail.len() == 4
        && all_digits(tail)
    {
        return Some(head.to_string());
    }
    if !all_digits(value) {
        return None;
    }
    match value.len() {
        3 | 4 => Some(format!("{value:0>5}")),
        9 => Some(value[..5].to_string()),
        _ => None,
    }
}

pub(super) fn check(value: &str) -> Option<Finding> {
    if is_valid(value) {
        return None;
    }
    Some(Finding::new(IssueKind::InvalidZip).with_suggestion(suggest(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_five_digits_pass() {
        assert!(is_valid("63101"));
        assert!(is_valid("02134"));
        assert!(!is_valid("6310"));
        assert!(!is_valid("631011"));
        assert!(!is_valid("6310a"));
        assert!(!is_valid("63101-1234"));
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest("2134").as_deref(), Some("02134"));
        assert_eq!(suggest("501").as_deref(), Some("00501"));
        assert_eq!(suggest("63101-1234").as_deref(), Some("63101"));
        assert_eq!(suggest("631011234").as_deref(), Some("63101"));
        assert_eq!(suggest("12"), None);
        assert_eq!(suggest("n/a"), None);
    }
}
