#![allow(dead_code)]

use eda_profile::{Column, Dataset};

/// Installs a test-friendly logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a dataset, panicking on construction errors.
pub fn dataset(columns: Vec<Column>) -> Dataset {
    Dataset::new(columns).expect("valid dataset")
}

/// String column without missing values.
pub fn text_column(name: &str, values: &[&str]) -> Column {
    Column::strings(name, values.iter().map(|v| Some(*v)))
}

/// Float column without missing values.
pub fn float_column(name: &str, values: &[f64]) -> Column {
    Column::floats(name, values.iter().map(|v| Some(*v)))
}

/// The three-column customer table used across scenarios.
pub fn signup_dataset() -> Dataset {
    dataset(vec![
        Column::integers("id", [Some(1), Some(2), Some(3), Some(4)]),
        text_column("status", &["a", "a", "b", "a"]),
        text_column(
            "signup",
            &["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
        ),
    ])
}
