//! Alias-based header detection.

use census_model::{CanonicalField, HeaderMapping};
use census_standards::FieldCatalog;
use serde::Serialize;
use tracing::debug;

use crate::score::{HeaderCandidate, rank_candidates};
use crate::utils::normalize_header_key;

/// How an auto-detected header matched its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized header equals a normalized alias.
    Exact,
    /// Normalized header contains a normalized alias.
    Substring,
}

/// A header the aliaser assigned on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasMatch {
    pub field: CanonicalField,
    pub header: String,
    pub alias: String,
    pub kind: MatchKind,
}

/// Catalog aliases, normalized once.
#[derive(Debug, Clone)]
pub struct HeaderAliaser {
    /// `(field, original alias, normalized alias)` in catalog order.
    aliases: Vec<(CanonicalField, String, String)>,
}

impl HeaderAliaser {
    pub fn new(catalog: &FieldCatalog) -> Self {
        let aliases = catalog
            .fields()
            .iter()
            .flat_map(|spec| {
                spec.aliases.iter().filter_map(move |alias| {
                    let normalized = normalize_header_key(alias);
                    (!normalized.is_empty()).then(|| (spec.field, alias.clone(), normalized))
                })
            })
            .collect();
        Self { aliases }
    }

    fn aliases_for(&self, field: CanonicalField) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .filter(move |(owner, _, _)| *owner == field)
            .map(|(_, alias, normalized)| (alias.as_str(), normalized.as_str()))
    }

    /// Fill every unmapped field from `headers`.
    ///
    /// `existing` entries are kept as-is. Exact matches are resolved for all
    /// fields before any substring match, so a header that is an exact alias
    /// of a later field is not claimed by an earlier field's substring. Within
    /// a pass, fields go in catalog order and the first unused header in
    /// upload order wins.
    pub fn map_headers(&self, headers: &[String], existing: &HeaderMapping) -> HeaderMapping {
        self.detect(headers, existing).0
    }

    /// Like [`map_headers`](Self::map_headers), also reporting each auto-detected match.
    pub fn detect(
        &self,
        headers: &[String],
        existing: &HeaderMapping,
    ) -> (HeaderMapping, Vec<AliasMatch>) {
        let mut mapping = existing.clone();
        let mut matches = Vec::new();
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header_key(h)).collect();

        for kind in [MatchKind::Exact, MatchKind::Substring] {
            for field in CanonicalField::ALL {
                if mapping.contains_field(field) {
                    continue;
                }
                let Some((header, alias)) = self.find_match(field, kind, headers, &normalized, &mapping)
                else {
                    continue;
                };
                debug!(
                    field = field.id(),
                    header = %header,
                    alias = %alias,
                    kind = ?kind,
                    "header auto-mapped"
                );
                if mapping.assign(field, header.clone()).is_ok() {
                    matches.push(AliasMatch {
                        field,
                        header,
                        alias,
                        kind,
                    });
                }
            }
        }
        (mapping, matches)
    }

    fn find_match(
        &self,
        field: CanonicalField,
        kind: MatchKind,
        headers: &[String],
        normalized: &[String],
        mapping: &HeaderMapping,
    ) -> Option<(String, String)> {
        for (header, key) in headers.iter().zip(normalized) {
            if key.is_empty() || mapping.is_header_used(header) {
                continue;
            }
            for (alias, alias_key) in self.aliases_for(field) {
                let hit = match kind {
                    MatchKind::Exact => key == alias_key,
                    MatchKind::Substring => key.contains(alias_key),
                };
                if hit {
                    return Some((header.clone(), alias.to_string()));
                }
            }
        }
        None
    }

    /// Unused headers ranked by similarity to `field`'s aliases, best first.
    pub fn candidates(
        &self,
        field: CanonicalField,
        headers: &[String],
        mapping: &HeaderMapping,
        limit: usize,
    ) -> Vec<HeaderCandidate> {
        let aliases: Vec<&str> = self.aliases_for(field).map(|(_, key)| key).collect();
        let available: Vec<&String> = headers
            .iter()
            .filter(|header| !mapping.is_header_used(header))
            .collect();
        rank_candidates(&available, &aliases, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliaser() -> HeaderAliaser {
        HeaderAliaser::new(FieldCatalog::builtin().unwrap())
    }

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn maps_common_headers_exactly() {
        let headers = headers(&["First", "Last", "DOB", "Zip", "Gender", "Rel", "Tier"]);
        let (mapping, matches) = aliaser().detect(&headers, &HeaderMapping::new());
        assert_eq!(mapping.len(), 7);
        assert!(matches.iter().all(|m| m.kind == MatchKind::Exact));
        assert_eq!(mapping.header_for(CanonicalField::Relationship), Some("Rel"));
        assert_eq!(
            mapping.header_for(CanonicalField::EnrollmentTier),
            Some("Tier")
        );
    }

    #[test]
    fn falls_back_to_substring_match() {
        let headers = headers(&["Employee First Name Legal", "Home Zip Code 5"]);
        let (mapping, matches) = aliaser().detect(&headers, &HeaderMapping::new());
        assert_eq!(
            mapping.header_for(CanonicalField::FirstName),
            Some("Employee First Name Legal")
        );
        assert_eq!(
            mapping.header_for(CanonicalField::Zip),
            Some("Home Zip Code 5")
        );
        assert!(matches.iter().all(|m| m.kind == MatchKind::Substring));
    }

    #[test]
    fn exact_match_beats_earlier_substring_header() {
        let headers = headers(&["Home Zip Code 5", "Zip", "Coverage Tier"]);
        let mapping = aliaser().map_headers(&headers, &HeaderMapping::new());
        assert_eq!(mapping.header_for(CanonicalField::Zip), Some("Zip"));
        assert_eq!(
            mapping.header_for(CanonicalField::EnrollmentTier),
            Some("Coverage Tier")
        );
    }

    #[test]
    fn claimed_header_is_not_reused() {
        let headers = headers(&["Last Name First Name"]);
        let mapping = aliaser().map_headers(&headers, &HeaderMapping::new());
        assert_eq!(
            mapping.header_for(CanonicalField::FirstName),
            Some("Last Name First Name")
        );
        assert_eq!(mapping.header_for(CanonicalField::LastName), None);
    }

    #[test]
    fn first_header_in_upload_order_wins_ties() {
        let headers = headers(&["Sex", "Gender"]);
        let mapping = aliaser().map_headers(&headers, &HeaderMapping::new());
        assert_eq!(mapping.header_for(CanonicalField::Gender), Some("Sex"));
    }

    #[test]
    fn existing_entries_are_never_overwritten() {
        let headers = headers(&["DOB", "Hire Date"]);
        let mut existing = HeaderMapping::new();
        existing.assign(CanonicalField::Dob, "Hire Date").unwrap();
        let mapping = aliaser().map_headers(&headers, &existing);
        assert_eq!(mapping.header_for(CanonicalField::Dob), Some("Hire Date"));
        // "DOB" stays unused; nothing else aliases it.
        assert!(!mapping.is_header_used("DOB"));
    }

    #[test]
    fn ambiguous_headers_stay_unmapped() {
        let headers = headers(&["Name", "Code", "Date"]);
        let mapping = aliaser().map_headers(&headers, &HeaderMapping::new());
        assert!(mapping.is_empty());
    }
}
