//! Logical role inference.
//!
//! Each column gets exactly one [`Role`]. Storage decides first (numeric and
//! datetime storage short-circuit); string columns are sampled and run
//! through [`temporal::detect_datetime`], and fall back to a cardinality
//! split between categorical and text.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{StorageType, Value},
    dataset::{Column, Dataset},
    temporal::{self, Detection},
};

/// Non-missing values inspected when deciding whether strings are dates.
pub const DATETIME_SAMPLE_SIZE: usize = 500;
/// Distinct-value ceiling for the categorical role.
pub const CATEGORICAL_MAX_UNIQUE: usize = 100;
/// Distinct-value floor for the categorical role on small datasets.
pub const CATEGORICAL_MIN_UNIQUE: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Numeric,
    Categorical,
    Datetime,
    Text,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Numeric, Role::Categorical, Role::Datetime, Role::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Numeric => "numeric",
            Role::Categorical => "categorical",
            Role::Datetime => "datetime",
            Role::Text => "text",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column names partitioned by role, each list in dataset order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleMap {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
    pub text: Vec<String>,
}

impl RoleMap {
    pub fn columns(&self, role: Role) -> &[String] {
        match role {
            Role::Numeric => &self.numeric,
            Role::Categorical => &self.categorical,
            Role::Datetime => &self.datetime,
            Role::Text => &self.text,
        }
    }

    pub fn role_of(&self, name: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.columns(*role).iter().any(|c| c == name))
    }

    pub fn len(&self) -> usize {
        Role::ALL.iter().map(|role| self.columns(*role).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, role: Role, name: &str) {
        let list = match role {
            Role::Numeric => &mut self.numeric,
            Role::Categorical => &mut self.categorical,
            Role::Datetime => &mut self.datetime,
            Role::Text => &mut self.text,
        };
        list.push(name.to_string());
    }
}

/// Largest distinct count that still classifies a string column as categorical.
pub fn categorical_threshold(row_count: usize) -> usize {
    let scaled = row_count / 5;
    CATEGORICAL_MAX_UNIQUE.min(CATEGORICAL_MIN_UNIQUE.max(scaled))
}

pub fn classify(dataset: &Dataset) -> RoleMap {
    let threshold = categorical_threshold(dataset.row_count());
    let mut roles = RoleMap::default();
    for column in dataset.columns() {
        let role = classify_column(column, threshold);
        roles.push(role, column.name());
    }
    roles
}

fn classify_column(column: &Column, categorical_threshold: usize) -> Role {
    match column.storage() {
        StorageType::Integer | StorageType::Float | StorageType::Boolean => {
            debug!("Column '{}' has numeric storage", column.name());
            Role::Numeric
        }
        StorageType::DateTime => {
            debug!("Column '{}' has datetime storage", column.name());
            Role::Datetime
        }
        StorageType::String => {
            let sample = datetime_sample(column);
            let detection = temporal::detect_datetime(&sample);
            if detection.is_datetime() {
                log_detection(column.name(), &detection);
                return Role::Datetime;
            }
            let unique = column.distinct_count();
            let role = if unique <= categorical_threshold {
                Role::Categorical
            } else {
                Role::Text
            };
            debug!(
                "Column '{}' classified {role}: {unique} distinct value(s), threshold {categorical_threshold} ({detection:?})",
                column.name()
            );
            role
        }
        StorageType::Other => {
            debug!("Column '{}' has opaque storage; treating as text", column.name());
            Role::Text
        }
    }
}

/// First non-missing string values of `column`, as the datetime detector sees them.
pub(crate) fn datetime_sample(column: &Column) -> Vec<&str> {
    column
        .present()
        .filter_map(|value| match value {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .take(DATETIME_SAMPLE_SIZE)
        .collect()
}

fn log_detection(name: &str, detection: &Detection) {
    match detection {
        Detection::Pattern { pattern, ratio } => {
            debug!(
                "Column '{name}' classified datetime: pattern {} parsed {ratio:.3}",
                pattern.format
            )
        }
        Detection::FreeForm { ratio } => {
            debug!("Column '{name}' classified datetime: free-form parse {ratio:.3}")
        }
        Detection::Rejected { .. } => {}
    }
}
