//! Operator header choices.

use census_model::HeaderMapping;
use tracing::debug;

use crate::error::MappingError;

/// Layer operator choices over `base`.
///
/// Every override must name a header present in `headers`. An override wins
/// over whatever `base` had for that field; if the header was held by another
/// field in `base`, that field is released so it can be re-detected.
pub fn apply_operator_mapping(
    base: &HeaderMapping,
    overrides: &HeaderMapping,
    headers: &[String],
) -> Result<HeaderMapping, MappingError> {
    for (_, header) in overrides.iter() {
        if !headers.iter().any(|present| present == header) {
            return Err(MappingError::ColumnNotFound(header.to_string()));
        }
    }

    let mut merged = base.clone();
    for (field, header) in overrides.iter() {
        if let Some(owner) = merged.field_for_header(header)
            && owner != field
        {
            debug!(field = owner.id(), header, "released by operator mapping");
            merged.remove(owner);
        }
        merged
            .assign(field, header)
            .map_err(|_| MappingError::ColumnAlreadyUsed {
                column: header.to_string(),
                field: field.id().to_string(),
            })?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use census_model::CanonicalField;

    use super::*;

    fn headers() -> Vec<String> {
        ["Emp DOB", "Hire Date", "Zip"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    #[test]
    fn override_replaces_detected_header() {
        let mut base = HeaderMapping::new();
        base.assign(CanonicalField::Dob, "Emp DOB").unwrap();
        let mut overrides = HeaderMapping::new();
        overrides.assign(CanonicalField::Dob, "Hire Date").unwrap();

        let merged = apply_operator_mapping(&base, &overrides, &headers()).unwrap();
        assert_eq!(merged.header_for(CanonicalField::Dob), Some("Hire Date"));
    }

    #[test]
    fn override_releases_header_from_other_field() {
        let mut base = HeaderMapping::new();
        base.assign(CanonicalField::Zip, "Zip").unwrap();
        base.assign(CanonicalField::Dob, "Emp DOB").unwrap();
        let mut overrides = HeaderMapping::new();
        overrides.assign(CanonicalField::FirstName, "Zip").unwrap();

        let merged = apply_operator_mapping(&base, &overrides, &headers()).unwrap();
        assert_eq!(merged.header_for(CanonicalField::FirstName), Some("Zip"));
        assert_eq!(merged.header_for(CanonicalField::Zip), None);
        assert_eq!(merged.header_for(CanonicalField::Dob), Some("Emp DOB"));
    }

    #[test]
    fn rejects_unknown_header() {
        let mut overrides = HeaderMapping::new();
        overrides.assign(CanonicalField::Dob, "Birth").unwrap();
        let err = apply_operator_mapping(&HeaderMapping::new(), &overrides, &headers())
            .unwrap_err();
        assert_eq!(err, MappingError::ColumnNotFound("Birth".to_string()));
        assert_eq!(err.column(), "Birth");
    }
}
