//! Profiling entry point: classify once, fan the five analyzers out over the
//! shared read-only dataset, and gather their outputs.

use std::{collections::BTreeMap, panic, thread};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    categorical::{self, CategoricalProfile},
    config::ProfileConfig,
    correlation::{self, CorrelationReport},
    dataset::Dataset,
    datetime::{self, DatetimeReport},
    error::ProfileError,
    numeric::{self, NumericProfile},
    roles::{self, RoleMap},
    summary::{self, Summary},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileResult {
    pub summary: Summary,
    pub roles: RoleMap,
    pub numeric: BTreeMap<String, NumericProfile>,
    pub categorical: BTreeMap<String, CategoricalProfile>,
    pub datetime: DatetimeReport,
    pub correlations: CorrelationReport,
}

impl ProfileResult {
    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Profiles `dataset`. Total: any well-formed dataset yields a result.
pub fn profile(dataset: &Dataset, config: &ProfileConfig) -> ProfileResult {
    let roles = roles::classify(dataset);
    let result = if config.parallel {
        gather_parallel(dataset, roles, config.max_corr_cols)
    } else {
        gather_sequential(dataset, roles, config.max_corr_cols)
    };
    info!(
        "Profiled {} row(s) across {} column(s): {} numeric, {} categorical, {} datetime, {} text",
        result.summary.n_rows,
        result.summary.n_cols,
        result.roles.numeric.len(),
        result.roles.categorical.len(),
        result.roles.datetime.len(),
        result.roles.text.len()
    );
    result
}

/// Like [`profile`], but reports a dataset without columns as an error.
pub fn try_profile(dataset: &Dataset, config: &ProfileConfig) -> Result<ProfileResult, ProfileError> {
    dataset.ensure_not_empty()?;
    Ok(profile(dataset, config))
}

fn gather_sequential(dataset: &Dataset, roles: RoleMap, max_corr_cols: usize) -> ProfileResult {
    ProfileResult {
        summary: summary::summarize(dataset),
        numeric: numeric::analyze_numeric(dataset, &roles),
        categorical: categorical::analyze_categorical(dataset, &roles),
        datetime: datetime::analyze_datetime(dataset, &roles),
        correlations: correlation::analyze_correlations(dataset, &roles, max_corr_cols),
        roles,
    }
}

fn gather_parallel(dataset: &Dataset, roles: RoleMap, max_corr_cols: usize) -> ProfileResult {
    let shared = &roles;
    let (summary, numeric, categorical, datetime, correlations) = thread::scope(|scope| {
        let summary = scope.spawn(|| summary::summarize(dataset));
        let numeric = scope.spawn(|| numeric::analyze_numeric(dataset, shared));
        let categorical = scope.spawn(|| categorical::analyze_categorical(dataset, shared));
        let datetime = scope.spawn(|| datetime::analyze_datetime(dataset, shared));
        let correlations =
            scope.spawn(|| correlation::analyze_correlations(dataset, shared, max_corr_cols));
        (
            join(summary),
            join(numeric),
            join(categorical),
            join(datetime),
            join(correlations),
        )
    });
    ProfileResult {
        summary,
        roles,
        numeric,
        categorical,
        datetime,
        correlations,
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}
