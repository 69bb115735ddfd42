//! Tests for census-model types.

use census_model::{
    CanonicalField, CensusStatus, HeaderMapping, Issue, QuoteId, RunInputs, RunStatus,
    StandardizationRun, UploadKind, ValueMappings,
};
use chrono::DateTime;

#[test]
fn quote_ids_reject_path_like_values() {
    assert!(QuoteId::new("Q-1001").is_ok());
    assert_eq!(QuoteId::new("  Q-1001 ").unwrap().as_str(), "Q-1001");
    assert!(QuoteId::new("").is_err());
    assert!(QuoteId::new("../etc").is_err());
    assert!(QuoteId::new("a/b").is_err());
    assert!(QuoteId::new("..").is_err());
}

#[test]
fn census_status_follows_latest_run() {
    let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    assert_eq!(CensusStatus::from_run(None), CensusStatus::Unvalidated);

    let clean = StandardizationRun::new(RunInputs::default(), &[], at);
    assert_eq!(CensusStatus::from_run(Some(&clean)), CensusStatus::Complete);

    let issues = vec![Issue::new(1, CanonicalField::Zip, "Zip code must be exactly 5 digits")];
    let dirty = StandardizationRun::new(RunInputs::default(), &issues, at);
    assert_eq!(dirty.status(), RunStatus::NeedsReview);
    assert_eq!(CensusStatus::from_run(Some(&dirty)), CensusStatus::NeedsReview);
}

#[test]
fn header_mapping_serializes_as_field_keyed_object() {
    let mut mapping = HeaderMapping::new();
    mapping
        .assign(CanonicalField::Dob, "Date of Birth")
        .expect("assign");
    let json = serde_json::to_string(&mapping).expect("serialize");
    assert_eq!(json, r#"{"dob":"Date of Birth"}"#);

    let parsed: HeaderMapping = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed.header_for(CanonicalField::Dob), Some("Date of Birth"));
}

#[test]
fn value_mappings_merge_lets_newer_entries_win() {
    let mut base = ValueMappings::new();
    base.insert(CanonicalField::EnrollmentTier, "family", "EF");
    base.insert(CanonicalField::Gender, "woman", "F");

    let mut newer = ValueMappings::new();
    newer.insert(CanonicalField::EnrollmentTier, "FAMILY", "ef ");

    base.merge(&newer);
    assert_eq!(
        base.lookup(CanonicalField::EnrollmentTier, "Family"),
        Some("EF")
    );
    assert_eq!(base.lookup(CanonicalField::Gender, "WOMAN"), Some("F"));
}

#[test]
fn upload_kind_serializes_lowercase() {
    let json = serde_json::to_string(&UploadKind::Census).expect("serialize");
    assert_eq!(json, r#""census""#);
    assert_eq!(UploadKind::Standardized.as_str(), "standardized");
}
