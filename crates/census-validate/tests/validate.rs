use census_ingest::CensusTable;
use census_model::{
    CENSUS_WIDE_FIELD, CanonicalField, CellCorrections, HeaderMapping, RunStatus, ValueMappings,
};
use census_standards::FieldCatalog;
use census_validate::{ValidationFault, ValidationInput, ValidationReport, validate};
use proptest::prelude::*;
use proptest::test_runner::Config;

const HEADERS: [&str; 7] = ["First", "Last", "DOB", "Zip", "Gender", "Rel", "Tier"];

fn catalog() -> &'static FieldCatalog {
    FieldCatalog::builtin().expect("builtin catalog")
}

fn table(rows: &[[&str; 7]]) -> CensusTable {
    let mut records = vec![HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    records.extend(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect()),
    );
    CensusTable::from_records(records).expect("table")
}

fn full_mapping() -> HeaderMapping {
    let mut mapping = HeaderMapping::new();
    for (field, header) in CanonicalField::ALL.into_iter().zip(HEADERS) {
        mapping.assign(field, header).unwrap();
    }
    mapping
}

fn run(
    table: &CensusTable,
    mapping: &HeaderMapping,
    value_mappings: &ValueMappings,
    corrections: &CellCorrections,
) -> ValidationReport {
    validate(
        catalog(),
        &ValidationInput {
            table,
            mapping,
            value_mappings,
            corrections,
        },
    )
    .expect("validation")
}

#[test]
fn clean_census_is_complete() {
    let table = table(&[["Jane", "Doe", "01/26/1968", "63101", "F", "E", "EE"]]);
    let report = run(
        &table,
        &full_mapping(),
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    assert!(report.is_clean());
    assert_eq!(report.status(), RunStatus::Complete);
    assert_eq!(
        report.rows,
        vec![vec!["Jane", "Doe", "01/26/1968", "63101", "F", "E", "EE"]]
    );
}

#[test]
fn header_only_census_needs_review() {
    let table = table(&[]);
    let report = run(
        &table,
        &full_mapping(),
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    assert_eq!(report.status(), RunStatus::NeedsReview);
    assert_eq!(report.len(), 1);
    assert_eq!(report.issues[0].row, 0);
    assert_eq!(report.issues[0].field, CENSUS_WIDE_FIELD);
    assert!(report.rows.is_empty());
}

#[test]
fn scenario_flags_zip_and_gender_until_fixed() {
    let table = table(&[["Jane", "Doe", "1990-05-01", "6310", "female", "E", "EE"]]);
    let mapping = full_mapping();
    let report = run(
        &table,
        &mapping,
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    let fields: Vec<&str> = report.issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, vec!["zip", "gender"]);
    assert_eq!(report.status(), RunStatus::NeedsReview);
    assert_eq!(report.issues[0].value.as_deref(), Some("6310"));
    assert_eq!(report.issues[1].mapped_value.as_deref(), Some("F"));

    let mut value_mappings = ValueMappings::new();
    value_mappings.insert(CanonicalField::Gender, "female", "F");
    let mut corrections = CellCorrections::new();
    corrections.set(1, CanonicalField::Zip, "63101");
    let report = run(&table, &mapping, &value_mappings, &corrections);
    assert!(report.is_clean());
    // Accepted ISO dates are exported in US layout.
    assert_eq!(report.rows[0][2], "05/01/1990");
    assert_eq!(report.rows[0][4], "F");
}

#[test]
fn bad_date_round_trip() {
    let records = vec![
        vec!["Date of Birth".to_string()],
        vec!["13/40/2020".to_string()],
    ];
    let table = CensusTable::from_records(records).unwrap();
    let mut mapping = HeaderMapping::new();
    mapping.assign(CanonicalField::Dob, "Date of Birth").unwrap();

    let report = run(
        &table,
        &mapping,
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    let row_issues: Vec<_> = report.issues.iter().filter(|i| i.row == 1).collect();
    assert_eq!(row_issues.len(), 1);
    assert_eq!(row_issues[0].field, "dob");

    let mut corrections = CellCorrections::new();
    corrections.set(1, CanonicalField::Dob, "01/26/1968");
    let report = run(&table, &mapping, &ValueMappings::new(), &corrections);
    assert!(report.issues.iter().all(|i| i.row != 1));
    // Other fields are still unmapped.
    assert_eq!(report.len(), 6);
    assert!(report.issues.iter().all(|i| i.issue == "Missing required column"));
}

#[test]
fn unmapped_fields_raise_one_aggregate_issue_each() {
    let table = table(&[
        ["Jane", "Doe", "01/26/1968", "63101", "F", "E", "EE"],
        ["John", "Doe", "01/26/1968", "63101", "M", "S", "ES"],
    ]);
    let mut mapping = full_mapping();
    mapping.remove(CanonicalField::Gender);
    let report = run(
        &table,
        &mapping,
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    assert_eq!(report.len(), 1);
    assert_eq!(report.issues[0].row, 0);
    assert_eq!(report.issues[0].field, "gender");
    assert_eq!(report.status(), RunStatus::NeedsReview);
    assert!(report.rows.iter().all(|row| row[4].is_empty()));
}

#[test]
fn issues_are_ordered_by_row_then_field() {
    let table = table(&[
        ["", "Doe", "bad", "1", "X", "E", "EE"],
        ["Jane", "", "01/26/1968", "63101", "F", "Q", "ZZ"],
    ]);
    let mut mapping = full_mapping();
    mapping.remove(CanonicalField::Zip);
    let report = run(
        &table,
        &mapping,
        &ValueMappings::new(),
        &CellCorrections::new(),
    );
    let keys: Vec<(usize, &str)> = report
        .issues
        .iter()
        .map(|i| (i.row, i.field.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (0, "zip"),
            (1, "first_name"),
            (1, "dob"),
            (1, "gender"),
            (2, "last_name"),
            (2, "relationship"),
            (2, "enrollment_tier"),
        ]
    );
    assert_eq!(report.issues[1].issue, "Missing value");
    assert_eq!(report.issues[1].value, None);
}

#[test]
fn mapping_to_unknown_header_is_a_fault() {
    let table = table(&[["Jane", "Doe", "01/26/1968", "63101", "F", "E", "EE"]]);
    let mut mapping = full_mapping();
    mapping.assign(CanonicalField::Zip, "Postal").unwrap();
    let err = validate(
        catalog(),
        &ValidationInput {
            table: &table,
            mapping: &mapping,
            value_mappings: &ValueMappings::new(),
            corrections: &CellCorrections::new(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationFault::HeaderNotInTable {
            field: "zip".to_string(),
            header: "Postal".to_string()
        }
    );
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("F".to_string()),
        Just("female".to_string()),
        Just("01/26/1968".to_string()),
        Just("1968-01-26".to_string()),
        Just("6310".to_string()),
        Just("63101".to_string()),
        Just("EE".to_string()),
        "[A-Za-z0-9/ -]{0,10}",
    ]
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn validation_is_idempotent(
        rows in prop::collection::vec(prop::collection::vec(cell(), 7), 0..12),
        drop_field in prop::option::of(0usize..7),
    ) {
        let mut records = vec![HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        records.extend(rows);
        let table = CensusTable::from_records(records).unwrap();
        let mut mapping = full_mapping();
        if let Some(idx) = drop_field {
            mapping.remove(CanonicalField::ALL[idx]);
        }
        let mut value_mappings = ValueMappings::new();
        value_mappings.insert(CanonicalField::Gender, "female", "F");
        let corrections = CellCorrections::new();

        let first = run(&table, &mapping, &value_mappings, &corrections);
        let second = run(&table, &mapping, &value_mappings, &corrections);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.status() == RunStatus::Complete, first.issues.is_empty());
        prop_assert_eq!(first.rows.len(), table.row_count());
    }
}
