use census_model::CanonicalField;
use census_standards::{FieldCatalog, RuleKind, StandardsError};

fn minimal_catalog(extra: &str) -> String {
    let mut doc = String::from("version = \"test-1\"\n");
    for (id, rule, codes) in [
        ("first_name", "required", ""),
        ("last_name", "required", ""),
        ("dob", "date", ""),
        ("zip", "zip", ""),
        ("gender", "code_set", "codes = [\"m\", \"f\"]"),
        ("relationship", "code_set", "codes = [\"E\", \"S\", \"C\"]"),
        ("enrollment_tier", "code_set", "codes = [\"EE\", \"W\"]"),
    ] {
        doc.push_str(&format!(
            "[[fields]]\nid = \"{id}\"\nlabel = \"{id}\"\nrule = \"{rule}\"\n{codes}\naliases = [\"{id}\"]\n\n"
        ));
    }
    doc.push_str(extra);
    doc
}

#[test]
fn loads_a_minimal_catalog() {
    let catalog = FieldCatalog::from_toml_str(&minimal_catalog("")).expect("catalog");
    assert_eq!(catalog.version(), "test-1");
    let gender = catalog.field(CanonicalField::Gender);
    assert_eq!(gender.rule.kind, RuleKind::CodeSet);
    assert_eq!(gender.rule.codes, vec!["M", "F"]);
    assert!(gender.rule.accepts_code("F"));
    assert!(!gender.rule.accepts_code("f"));
}

#[test]
fn rejects_duplicate_fields() {
    let doc = minimal_catalog(
        "[[fields]]\nid = \"zip\"\nlabel = \"Zip\"\nrule = \"zip\"\naliases = [\"postal\"]\n",
    );
    let err = FieldCatalog::from_toml_str(&doc).unwrap_err();
    assert_eq!(
        err,
        StandardsError::DuplicateField {
            id: "zip".to_string()
        }
    );
}

#[test]
fn rejects_unknown_fields_and_rules() {
    let doc = minimal_catalog(
        "[[fields]]\nid = \"middle_name\"\nlabel = \"Middle\"\nrule = \"required\"\naliases = [\"mi\"]\n",
    );
    assert!(matches!(
        FieldCatalog::from_toml_str(&doc),
        Err(StandardsError::UnknownField { .. })
    ));

    let bad_rule = minimal_catalog("").replace("rule = \"zip\"", "rule = \"postal\"");
    assert!(matches!(
        FieldCatalog::from_toml_str(&bad_rule),
        Err(StandardsError::Parse { .. })
    ));
}

#[test]
fn rejects_missing_fields() {
    let doc = "version = \"x\"\n[[fields]]\nid = \"zip\"\nlabel = \"Zip\"\nrule = \"zip\"\naliases = [\"zip\"]\n";
    assert!(matches!(
        FieldCatalog::from_toml_str(doc),
        Err(StandardsError::MissingField { .. })
    ));
}

#[test]
fn rejects_synonyms_for_unknown_codes() {
    let doc = minimal_catalog("").replace(
        "codes = [\"EE\", \"W\"]",
        "codes = [\"EE\", \"W\"]\nsynonyms = { EF = [\"family\"] }",
    );
    let err = FieldCatalog::from_toml_str(&doc).unwrap_err();
    assert_eq!(
        err,
        StandardsError::UnknownSynonymTarget {
            id: "enrollment_tier".to_string(),
            code: "EF".to_string(),
        }
    );
}

#[test]
fn rejects_code_set_without_codes() {
    let doc = minimal_catalog("").replace("codes = [\"E\", \"S\", \"C\"]", "");
    assert_eq!(
        FieldCatalog::from_toml_str(&doc).unwrap_err(),
        StandardsError::EmptyCodes {
            id: "relationship".to_string()
        }
    );
}
