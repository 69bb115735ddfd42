//! Date of birth checks.
//!
//! Accepted: `MM/DD/YYYY` and `YYYY-MM-DD` with a four-digit year; month and
//! day may drop their leading zero. Other common layouts are not accepted but
//! produce a `MM/DD/YYYY` suggestion.

use chrono::NaiveDate;

use super::Finding;
use crate::issue::IssueKind;

#[derive(Debug, Clone, Copy)]
enum Layout {
    MonthDayYear,
    YearMonthDay,
    MonthDayShortYear,
}

const ACCEPTED: [(Layout, char); 2] = [
    (Layout::MonthDayYear, '/'),
    (Layout::YearMonthDay, '-'),
];

const ALTERNATIVES: [(Layout, char); 4] = [
    (Layout::MonthDayYear, '-'),
    (Layout::YearMonthDay, '/'),
    (Layout::MonthDayShortYear, '/'),
    (Layout::MonthDayShortYear, '-'),
];

/// Two-digit years below this are 20xx, the rest 19xx.
const SHORT_YEAR_PIVOT: i32 = 70;

fn parse_layout(value: &str, layout: Layout, separator: char) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(separator).collect();
    let [first, second, third] = parts.as_slice() else {
        return None;
    };
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit());
    if !parts.iter().all(|part| numeric(part)) {
        return None;
    }
    let (year, month, day) = match layout {
        Layout::MonthDayYear | Layout::MonthDayShortYear => (*third, *first, *second),
        Layout::YearMonthDay => (*first, *second, *third),
    };
    if month.len() > 2 || day.len() > 2 {
        return None;
    }
    let year = match layout {
        Layout::MonthDayShortYear if year.len() == 2 => {
            let short: i32 = year.parse().ok()?;
            if short < SHORT_YEAR_PIVOT {
                2000 + short
            } else {
                1900 + short
            }
        }
        Layout::MonthDayShortYear => return None,
        _ if year.len() == 4 => year.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// Parse a date of birth in one of the accepted layouts.
pub fn parse_dob(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ACCEPTED
        .iter()
        .find_map(|(layout, separator)| parse_layout(value, *layout, *separator))
}

pub fn format_dob(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// `MM/DD/YYYY` rendering of a date written in a layout we do not accept.
pub fn suggest(value: &str) -> Option<String> {
    let value = value.trim();
    // Timestamps exported from spreadsheets: keep the date part.
    let date_part = value
        .split(|ch: char| ch == ' ' || ch == 'T')
        .next()
        .unwrap_or(value);
    if date_part != value
        && let Some(date) = parse_dob(date_part)
    {
        return Some(format_dob(date));
    }
    ALTERNATIVES
        .iter()
        .find_map(|(layout, separator)| parse_layout(date_part, *layout, *separator))
        .map(format_dob)
}

pub(super) fn check(value: &str) -> Option<Finding> {
    if parse_dob(value).is_some() {
        return None;
    }
    Some(Finding::new(IssueKind::InvalidDate).with_suggestion(suggest(value)))
}
