//! Pairwise Pearson and Spearman correlation over numeric-role columns.
//!
//! Each pair uses only the rows where both columns are present. Pairs with
//! fewer than two such rows, or with a constant side, have no correlation.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::to_numeric, dataset::Dataset, error::ProfileError, roles::RoleMap, summary::round_to,
};

pub const DEFAULT_MAX_COLUMNS: usize = 40;
const DECIMALS: i32 = 3;

/// `matrix[a][b]`, symmetric, keyed by column name on both axes.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, Option<f64>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorrelationReport {
    pub pearson: Option<CorrelationMatrix>,
    pub spearman: Option<CorrelationMatrix>,
    /// Numeric columns considered, after truncation.
    pub columns: Vec<String>,
}

impl CorrelationReport {
    pub fn is_computed(&self) -> bool {
        self.pearson.is_some() && self.spearman.is_some()
    }

    pub fn ensure_computed(&self) -> Result<(), ProfileError> {
        if self.is_computed() {
            Ok(())
        } else {
            Err(ProfileError::InsufficientNumericColumns {
                found: self.columns.len(),
            })
        }
    }

    pub fn matrix(&self, method: CorrelationMethod) -> Option<&CorrelationMatrix> {
        match method {
            CorrelationMethod::Pearson => self.pearson.as_ref(),
            CorrelationMethod::Spearman => self.spearman.as_ref(),
        }
    }

    pub fn get(&self, method: CorrelationMethod, a: &str, b: &str) -> Option<f64> {
        self.matrix(method)?.get(a)?.get(b).copied().flatten()
    }
}

pub fn analyze_correlations(
    dataset: &Dataset,
    roles: &RoleMap,
    max_cols: usize,
) -> CorrelationReport {
    let columns = roles
        .numeric
        .iter()
        .take(max_cols)
        .cloned()
        .collect::<Vec<_>>();
    if columns.len() < 2 {
        debug!(
            "Skipping correlations: {} numeric column(s) after cap of {max_cols}",
            columns.len()
        );
        return CorrelationReport {
            pearson: None,
            spearman: None,
            columns,
        };
    }

    let series = columns
        .iter()
        .map(|name| {
            dataset
                .column(name)
                .map(|column| {
                    column
                        .values()
                        .iter()
                        .map(|value| to_numeric(value.as_ref()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_else(|| vec![None; dataset.row_count()])
        })
        .collect::<Vec<_>>();

    CorrelationReport {
        pearson: Some(build_matrix(&columns, &series, CorrelationMethod::Pearson)),
        spearman: Some(build_matrix(&columns, &series, CorrelationMethod::Spearman)),
        columns,
    }
}

fn build_matrix(
    names: &[String],
    series: &[Vec<Option<f64>>],
    method: CorrelationMethod,
) -> CorrelationMatrix {
    let mut matrix: CorrelationMatrix = names
        .iter()
        .map(|name| {
            let mut row = BTreeMap::new();
            row.insert(name.clone(), Some(1.0));
            (name.clone(), row)
        })
        .collect();
    for (i, j) in (0..names.len()).tuple_combinations() {
        let (xs, ys) = complete_pairs(&series[i], &series[j]);
        let value = match method {
            CorrelationMethod::Pearson => pearson(&xs, &ys),
            CorrelationMethod::Spearman => spearman(&xs, &ys),
        }
        .map(|r| round_to(r, DECIMALS));
        if let Some(row) = matrix.get_mut(&names[i]) {
            row.insert(names[j].clone(), value);
        }
        if let Some(row) = matrix.get_mut(&names[j]) {
            row.insert(names[i].clone(), value);
        }
    }
    matrix
}

fn complete_pairs(left: &[Option<f64>], right: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    left.iter()
        .zip(right)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

/// Pearson's r over aligned samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Spearman's rho: Pearson over average ranks.
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    pearson(&average_ranks(xs), &average_ranks(ys))
}

/// 1-based ranks; tied values share the mean of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}
