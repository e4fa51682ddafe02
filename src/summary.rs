use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Dataset-level shape, missingness, storage and duplication metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub n_rows: usize,
    pub n_cols: usize,
    pub memory_mb: f64,
    pub dtypes: BTreeMap<String, String>,
    pub missing_count: BTreeMap<String, usize>,
    pub missing_ratio: BTreeMap<String, f64>,
    pub duplicate_rows: usize,
}

pub fn summarize(dataset: &Dataset) -> Summary {
    let n_rows = dataset.row_count();
    let mut dtypes = BTreeMap::new();
    let mut missing_count = BTreeMap::new();
    let mut missing_ratio = BTreeMap::new();

    for column in dataset.columns() {
        let missing = column.missing_count();
        let ratio = if n_rows > 0 {
            round_to(missing as f64 / n_rows as f64, 4)
        } else {
            0.0
        };
        dtypes.insert(column.name().to_string(), column.storage().to_string());
        missing_count.insert(column.name().to_string(), missing);
        missing_ratio.insert(column.name().to_string(), ratio);
    }

    Summary {
        n_rows,
        n_cols: dataset.column_count(),
        memory_mb: round_to(memory_bytes(dataset) as f64 / BYTES_PER_MEGABYTE, 3),
        dtypes,
        missing_count,
        missing_ratio,
        duplicate_rows: duplicate_rows(dataset),
    }
}

/// Approximate footprint: fixed cell width per row plus owned string bytes.
pub fn memory_bytes(dataset: &Dataset) -> usize {
    dataset
        .columns()
        .iter()
        .map(|column| {
            let fixed = column.len() * column.storage().fixed_width();
            let heap = column.present().map(|v| v.heap_size()).sum::<usize>();
            fixed + heap
        })
        .sum()
}

/// Rows identical to an earlier row across every column.
pub fn duplicate_rows(dataset: &Dataset) -> usize {
    let columns = dataset.columns();
    let mut seen = HashSet::with_capacity(dataset.row_count());
    let mut duplicates = 0;
    for row in 0..dataset.row_count() {
        let key = columns
            .iter()
            .map(|column| column.values()[row].as_ref())
            .collect::<Vec<_>>();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
