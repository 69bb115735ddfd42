//! Value normalization against operator value mappings.

use census_model::{CanonicalField, ValueMappings};
use tracing::debug;

/// Mapped replacement for `raw`, if the field's value mapping has one.
///
/// The lookup key is the trimmed, case-folded raw value. Targets are stored
/// already sanitized, so the result needs no further cleanup.
pub fn resolve_value<'a>(
    raw: &str,
    field: CanonicalField,
    mappings: &'a ValueMappings,
) -> Option<&'a str> {
    let mapped = mappings.lookup(field, raw)?;
    debug!(field = field.id(), "value mapping applied");
    Some(mapped)
}

/// Apply the field's value mapping to `raw`.
///
/// Values without a mapping are returned unchanged for the validator to judge.
pub fn normalize_value(raw: &str, field: CanonicalField, mappings: &ValueMappings) -> String {
    resolve_value(raw, field, mappings)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> ValueMappings {
        let mut mappings = ValueMappings::new();
        mappings.insert(CanonicalField::Gender, "female", "f");
        mappings.insert(CanonicalField::EnrollmentTier, "Family", "ef");
        mappings.insert(CanonicalField::FirstName, "jnae", "Jane");
        mappings
    }

    #[test]
    fn maps_case_and_whitespace_variants() {
        let mappings = mappings();
        assert_eq!(
            normalize_value(" FEMALE ", CanonicalField::Gender, &mappings),
            "F"
        );
        assert_eq!(
            normalize_value("family", CanonicalField::EnrollmentTier, &mappings),
            "EF"
        );
    }

    #[test]
    fn free_text_targets_keep_their_case() {
        assert_eq!(
            normalize_value("JNAE", CanonicalField::FirstName, &mappings()),
            "Jane"
        );
    }

    #[test]
    fn unmapped_values_pass_through() {
        let mappings = mappings();
        assert_eq!(normalize_value("x", CanonicalField::Gender, &mappings), "x");
        // Mappings are per field.
        assert_eq!(
            normalize_value("female", CanonicalField::Relationship, &mappings),
            "female"
        );
        assert_eq!(normalize_value("", CanonicalField::Gender, &mappings), "");
    }
}
