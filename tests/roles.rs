mod common;

use std::collections::HashSet;

use chrono::NaiveDate;
use eda_profile::{Column, Role, StorageType, Value, classify};
use proptest::prelude::*;

use common::{dataset, init_logging, text_column};

#[test]
fn storage_decides_numeric_and_datetime_roles() {
    init_logging();
    let stamp = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let data = dataset(vec![
        Column::integers("count", [Some(1), None]),
        Column::floats("ratio", [Some(0.5), Some(1.5)]),
        Column::booleans("flag", [Some(true), Some(false)]),
        Column::datetimes("seen_at", [Some(stamp), None]),
    ]);
    let roles = classify(&data);
    assert_eq!(roles.numeric, vec!["count", "ratio", "flag"]);
    assert_eq!(roles.datetime, vec!["seen_at"]);
    assert!(roles.categorical.is_empty());
    assert!(roles.text.is_empty());
}

#[test]
fn iso_date_strings_classify_as_datetime() {
    let data = dataset(vec![text_column(
        "d",
        &["2024-01-15", "2024-02-20", "2024-03-01"],
    )]);
    assert_eq!(classify(&data).role_of("d"), Some(Role::Datetime));
}

#[test]
fn fruit_names_are_never_datetime() {
    let data = dataset(vec![text_column("fruit", &["apple", "banana", "cherry"])]);
    let roles = classify(&data);
    assert_eq!(roles.role_of("fruit"), Some(Role::Categorical));
    assert!(roles.datetime.is_empty());
}

#[test]
fn mostly_dates_still_pass_the_pattern_stage() {
    let mut values = vec!["2024-05-01"; 8];
    values.extend(["unknown", "later"]);
    let data = dataset(vec![text_column("d", &values)]);
    assert_eq!(classify(&data).role_of("d"), Some(Role::Datetime));
}

#[test]
fn minute_precision_stamps_reach_free_form_stage() {
    let data = dataset(vec![text_column(
        "t",
        &["2024-01-15 10:30", "2024-01-16 11:45", "2024-01-17 09:00"],
    )]);
    assert_eq!(classify(&data).role_of("t"), Some(Role::Datetime));
}

#[test]
fn cardinality_splits_categorical_from_text() {
    let many = (0..30).map(|i| format!("user-{i}")).collect::<Vec<_>>();
    let few = (0..30).map(|i| format!("tier-{}", i % 3)).collect::<Vec<_>>();
    let data = dataset(vec![
        Column::strings("user", many.iter().map(|v| Some(v.as_str()))),
        Column::strings("tier", few.iter().map(|v| Some(v.as_str()))),
    ]);
    let roles = classify(&data);
    // 30 rows: threshold is max(10, 6) = 10.
    assert_eq!(roles.text, vec!["user"]);
    assert_eq!(roles.categorical, vec!["tier"]);
}

#[test]
fn exactly_threshold_unique_values_stay_categorical() {
    let values = (0..10).map(|i| format!("v{i}")).collect::<Vec<_>>();
    let data = dataset(vec![Column::strings(
        "v",
        values.iter().map(|v| Some(v.as_str())),
    )]);
    assert_eq!(classify(&data).role_of("v"), Some(Role::Categorical));

    let values = (0..11).map(|i| format!("v{i}")).collect::<Vec<_>>();
    let data = dataset(vec![Column::strings(
        "v",
        values.iter().map(|v| Some(v.as_str())),
    )]);
    assert_eq!(classify(&data).role_of("v"), Some(Role::Text));
}

#[test]
fn all_missing_string_column_is_categorical() {
    let data = dataset(vec![Column::strings("blank", [None::<&str>, None, None])]);
    assert_eq!(classify(&data).categorical, vec!["blank"]);
}

#[test]
fn opaque_storage_defaults_to_text() {
    let column = Column::new(
        "mixed",
        StorageType::Other,
        vec![Some(Value::Integer(1)), Some(Value::String("x".into()))],
    )
    .expect("column");
    let data = dataset(vec![column]);
    assert_eq!(classify(&data).text, vec!["mixed"]);
}

#[test]
fn zero_row_dataset_still_classifies_columns() {
    let data = dataset(vec![
        Column::integers("n", Vec::<Option<i64>>::new()),
        Column::strings("s", Vec::<Option<String>>::new()),
    ]);
    let roles = classify(&data);
    assert_eq!(roles.numeric, vec!["n"]);
    assert_eq!(roles.categorical, vec!["s"]);
}

#[test]
fn zero_column_dataset_has_empty_roles() {
    let roles = classify(&dataset(Vec::new()));
    assert!(roles.is_empty());
}

#[derive(Debug, Clone)]
enum GeneratedColumn {
    Integers(Vec<Option<i64>>),
    Floats(Vec<Option<f64>>),
    Words(Vec<Option<String>>),
    Dates(Vec<Option<String>>),
}

fn column_strategy(rows: usize) -> impl Strategy<Value = GeneratedColumn> {
    prop_oneof![
        proptest::collection::vec(proptest::option::of(any::<i64>()), rows)
            .prop_map(GeneratedColumn::Integers),
        proptest::collection::vec(proptest::option::of(-1e6f64..1e6), rows)
            .prop_map(GeneratedColumn::Floats),
        proptest::collection::vec(proptest::option::of("[a-z]{1,6}"), rows)
            .prop_map(GeneratedColumn::Words),
        proptest::collection::vec(
            proptest::option::of((2000u32..2030, 1u32..13, 1u32..29)
                .prop_map(|(y, m, d)| format!("{y}-{m:02}-{d:02}"))),
            rows,
        )
        .prop_map(GeneratedColumn::Dates),
    ]
}

fn table_strategy() -> impl Strategy<Value = Vec<GeneratedColumn>> {
    (0usize..40).prop_flat_map(|rows| proptest::collection::vec(column_strategy(rows), 0..8))
}

fn build_column(idx: usize, generated: GeneratedColumn) -> Column {
    let name = format!("c{idx}");
    match generated {
        GeneratedColumn::Integers(values) => Column::integers(name, values),
        GeneratedColumn::Floats(values) => Column::floats(name, values),
        GeneratedColumn::Words(values) | GeneratedColumn::Dates(values) => {
            Column::strings(name, values)
        }
    }
}

proptest! {
    #[test]
    fn every_column_gets_exactly_one_role(columns in table_strategy()) {
        let data = dataset(
            columns
                .into_iter()
                .enumerate()
                .map(|(idx, generated)| build_column(idx, generated))
                .collect(),
        );
        let roles = classify(&data);
        let mut assigned = Vec::new();
        for role in Role::ALL {
            assigned.extend(roles.columns(role).iter().cloned());
        }
        let unique = assigned.iter().cloned().collect::<HashSet<_>>();
        prop_assert_eq!(unique.len(), assigned.len());
        let expected = data
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<HashSet<_>>();
        prop_assert_eq!(unique, expected);
    }
}
