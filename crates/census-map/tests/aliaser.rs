use census_map::{HeaderAliaser, MappingError, apply_operator_mapping};
use census_model::{CanonicalField, HeaderMapping};
use census_standards::FieldCatalog;
use proptest::prelude::*;
use proptest::test_runner::Config;

fn aliaser() -> HeaderAliaser {
    HeaderAliaser::new(FieldCatalog::builtin().expect("builtin catalog"))
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn operator_choice_survives_rerun() {
    let headers = owned(&["First Name", "Last Name", "DOB", "Hire Date", "Zip"]);
    let aliaser = aliaser();
    let detected = aliaser.map_headers(&headers, &HeaderMapping::new());
    assert_eq!(detected.header_for(CanonicalField::Dob), Some("DOB"));

    let mut overrides = HeaderMapping::new();
    overrides.assign(CanonicalField::Dob, "Hire Date").unwrap();
    let chosen = apply_operator_mapping(&detected, &overrides, &headers).unwrap();
    let rerun = aliaser.map_headers(&headers, &chosen);

    assert_eq!(rerun.header_for(CanonicalField::Dob), Some("Hire Date"));
    assert_eq!(rerun, chosen);
}

#[test]
fn released_field_is_redetected() {
    let headers = owned(&["Sex", "Gender", "Zip"]);
    let aliaser = aliaser();
    let detected = aliaser.map_headers(&headers, &HeaderMapping::new());
    assert_eq!(detected.header_for(CanonicalField::Gender), Some("Sex"));

    // Operator moves "Sex" to first_name; gender falls back to "Gender".
    let mut overrides = HeaderMapping::new();
    overrides.assign(CanonicalField::FirstName, "Sex").unwrap();
    let chosen = apply_operator_mapping(&detected, &overrides, &headers).unwrap();
    let rerun = aliaser.map_headers(&headers, &chosen);
    assert_eq!(rerun.header_for(CanonicalField::FirstName), Some("Sex"));
    assert_eq!(rerun.header_for(CanonicalField::Gender), Some("Gender"));
}

#[test]
fn stale_operator_header_is_rejected() {
    let headers = owned(&["First", "Last"]);
    let mut overrides = HeaderMapping::new();
    overrides.assign(CanonicalField::Zip, "Postal").unwrap();
    let err = apply_operator_mapping(&HeaderMapping::new(), &overrides, &headers).unwrap_err();
    assert!(matches!(err, MappingError::ColumnNotFound(ref c) if c == "Postal"));
}

#[test]
fn candidates_exclude_mapped_headers() {
    let headers = owned(&["Brthdt", "DOB", "Zip"]);
    let aliaser = aliaser();
    let mut mapping = HeaderMapping::new();
    mapping.assign(CanonicalField::Zip, "Zip").unwrap();
    let candidates = aliaser.candidates(CanonicalField::Dob, &headers, &mapping, 3);
    assert!(!candidates.is_empty());
    assert_eq!(candidates[0].header, "DOB");
    assert!(candidates.iter().all(|c| c.header != "Zip"));
}

fn header_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("First Name".to_string()),
        Just("Last".to_string()),
        Just("Date of Birth".to_string()),
        Just("Zip Code".to_string()),
        Just("Sex".to_string()),
        Just("Relationship".to_string()),
        Just("Coverage Tier".to_string()),
        "[A-Za-z ]{1,12}",
    ]
}

fn headers_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(header_strategy(), 0..10).prop_map(|mut headers| {
        let mut seen = std::collections::BTreeSet::new();
        headers.retain(|h| seen.insert(h.clone()));
        headers
    })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn detection_is_idempotent(headers in headers_strategy()) {
        let aliaser = aliaser();
        let once = aliaser.map_headers(&headers, &HeaderMapping::new());
        let twice = aliaser.map_headers(&headers, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn detected_headers_are_distinct_and_present(headers in headers_strategy()) {
        let mapping = aliaser().map_headers(&headers, &HeaderMapping::new());
        let mut used = std::collections::BTreeSet::new();
        for (_, header) in mapping.iter() {
            prop_assert!(headers.iter().any(|h| h == header));
            prop_assert!(used.insert(header.to_string()));
        }
    }

    #[test]
    fn existing_entries_are_sticky(headers in headers_strategy(), pick in 0usize..10) {
        prop_assume!(!headers.is_empty());
        let header = headers[pick % headers.len()].clone();
        let mut existing = HeaderMapping::new();
        existing.assign(CanonicalField::Dob, header.clone()).unwrap();
        let mapping = aliaser().map_headers(&headers, &existing);
        prop_assert_eq!(mapping.header_for(CanonicalField::Dob), Some(header.as_str()));
    }
}
