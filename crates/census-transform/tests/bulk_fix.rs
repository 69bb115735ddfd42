use census_model::{CanonicalField, Issue, ValueMappings, normalize_value_key};
use census_transform::{BulkFix, normalize_value};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn field_strategy() -> impl Strategy<Value = CanonicalField> {
    prop::sample::select(CanonicalField::ALL.to_vec())
}

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(Some("female".to_string())),
        Just(Some(" Female".to_string())),
        Just(Some("FEMALE ".to_string())),
        Just(Some("male".to_string())),
        Just(None),
        "[a-zA-Z ]{0,8}".prop_map(Some),
    ]
}

fn issue_strategy() -> impl Strategy<Value = Issue> {
    (0usize..50, field_strategy(), value_strategy(), prop::option::of("[A-Z]{1,2}")).prop_map(
        |(row, field, value, mapped_value)| Issue {
            row,
            field: field.id().to_string(),
            issue: "invalid".to_string(),
            value,
            mapped_value,
        },
    )
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn bulk_fix_touches_exactly_the_matching_issues(
        issues in prop::collection::vec(issue_strategy(), 0..40)
    ) {
        let fix = BulkFix::new(CanonicalField::Gender, "female", "F").unwrap();
        let mut fixed = issues.clone();
        let touched = fix.apply_to_issues(&mut fixed);

        let mut expected_touched = 0;
        for (before, after) in issues.iter().zip(&fixed) {
            let matches = before.field == "gender"
                && before
                    .value
                    .as_deref()
                    .is_some_and(|v| normalize_value_key(v) == "female");
            if matches {
                expected_touched += 1;
                prop_assert_eq!(after.mapped_value.as_deref(), Some("F"));
                prop_assert_eq!(&after.value, &before.value);
            } else {
                prop_assert_eq!(after, before);
            }
        }
        prop_assert_eq!(touched, expected_touched);
    }

    #[test]
    fn recorded_fix_normalizes_every_spelling(
        padding in "[ ]{0,3}",
        upper in any::<bool>(),
    ) {
        let mut mappings = ValueMappings::new();
        BulkFix::new(CanonicalField::Relationship, "Spouse", "s")
            .unwrap()
            .record(&mut mappings);
        let raw = if upper { "SPOUSE" } else { "spouse" };
        let raw = format!("{padding}{raw}{padding}");
        prop_assert_eq!(
            normalize_value(&raw, CanonicalField::Relationship, &mappings),
            "S"
        );
    }
}
