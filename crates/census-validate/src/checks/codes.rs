//! Code-set checks (gender, relationship, enrollment tier).
//!
//! Values must equal a catalog code exactly. Case variants and synonyms are
//! only suggested; an operator accepts them through a correction or a bulk fix.

use census_standards::FieldSpec;

use super::Finding;
use crate::issue::IssueKind;

pub(super) fn check(spec: &FieldSpec, value: &str) -> Option<Finding> {
    if spec.rule.accepts_code(value) {
        return None;
    }
    let kind = IssueKind::InvalidCode {
        label: spec.label.clone(),
        codes: spec.rule.codes.clone(),
    };
    Some(Finding::new(kind).with_suggestion(spec.synonym_for(value).map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use census_model::CanonicalField;
    use census_standards::FieldCatalog;

    use super::*;

    fn gender() -> &'static FieldSpec {
        FieldCatalog::builtin().unwrap().field(CanonicalField::Gender)
    }

    #[test]
    fn exact_codes_pass() {
        assert!(check(gender(), "M").is_none());
        assert!(check(gender(), "F").is_none());
    }

    #[test]
    fn synonyms_and_case_are_suggested_not_accepted() {
        let finding = check(gender(), "female").unwrap();
        assert_eq!(finding.suggestion.as_deref(), Some("F"));
        assert_eq!(
            finding.kind.message(),
            "Gender must be one of: M, F"
        );
        let finding = check(gender(), "m").unwrap();
        assert_eq!(finding.suggestion.as_deref(), Some("M"));
        let finding = check(gender(), "x").unwrap();
        assert_eq!(finding.suggestion, None);
    }
}
