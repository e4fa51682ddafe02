//! Distribution statistics and IQR outliers for numeric-role columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    data::to_numeric,
    dataset::{Column, Dataset},
    roles::RoleMap,
};

/// Quantile levels reported in [`Describe`].
pub const PERCENTILES: [f64; 7] = [0.01, 0.05, 0.25, 0.5, 0.75, 0.95, 0.99];
pub const IQR_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "1%")]
    pub p1: Option<f64>,
    #[serde(rename = "5%")]
    pub p5: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    #[serde(rename = "95%")]
    pub p95: Option<f64>,
    #[serde(rename = "99%")]
    pub p99: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// `min`, the seven percentiles and `max`, in ascending level order.
    pub fn ordered_levels(&self) -> [Option<f64>; 9] {
        [
            self.min, self.p1, self.p5, self.p25, self.p50, self.p75, self.p95, self.p99,
            self.max,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericProfile {
    pub describe: Describe,
    pub iqr_outliers: usize,
    pub n_missing: usize,
}

pub fn analyze_numeric(dataset: &Dataset, roles: &RoleMap) -> BTreeMap<String, NumericProfile> {
    roles
        .numeric
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|column| (column.name().to_string(), profile_column(column)))
        .collect()
}

fn profile_column(column: &Column) -> NumericProfile {
    let coerced = column
        .values()
        .iter()
        .map(|value| to_numeric(value.as_ref()))
        .collect::<Vec<_>>();
    let values = coerced.iter().flatten().copied().collect::<Vec<_>>();
    let summary = describe(&values);
    let iqr_outliers = match (summary.p25, summary.p75) {
        (Some(q1), Some(q3)) => {
            let (lower, upper) = iqr_bounds(q1, q3);
            values.iter().filter(|&&v| v < lower || v > upper).count()
        }
        _ => 0,
    };
    NumericProfile {
        describe: summary,
        iqr_outliers,
        n_missing: coerced.len() - values.len(),
    }
}

/// Outlier fences `(q1 - 1.5 IQR, q3 + 1.5 IQR)`.
pub fn iqr_bounds(q1: f64, q3: f64) -> (f64, f64) {
    let iqr = q3 - q1;
    (q1 - IQR_MULTIPLIER * iqr, q3 + IQR_MULTIPLIER * iqr)
}

pub fn describe(values: &[f64]) -> Describe {
    if values.is_empty() {
        return Describe::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let [p1, p5, p25, p50, p75, p95, p99] = PERCENTILES.map(|q| percentile(&sorted, q));
    Describe {
        count: values.len(),
        mean: mean(values),
        std: std_dev(values),
        min: sorted.first().copied(),
        p1,
        p5,
        p25,
        p50,
        p75,
        p95,
        p99,
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks on ascending `sorted` data.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    if lower == upper || lo == hi {
        return Some(lo);
    }
    Some((lo + (hi - lo) * weight).min(hi))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator); undefined below 2 values.
fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_squares = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((sum_squares / (values.len() as f64 - 1.0)).sqrt())
}
