//! Error kinds surfaced by dataset construction and the profiling entry points.
//!
//! Column-level value problems never reach this type: unparsable tokens are
//! coerced to missing and counted by the analyzers instead.

use thiserror::Error;

use crate::data::StorageType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The dataset has no columns at all.
    #[error("dataset has no columns")]
    EmptyDataset,

    /// Correlation needs at least two numeric-role columns.
    #[error("correlation requires at least 2 numeric columns, found {found}")]
    InsufficientNumericColumns { found: usize },

    /// Two columns share a name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// A column's length disagrees with the rest of the dataset.
    #[error("column '{column}' has {found} value(s), expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A value does not belong to the column's declared storage type.
    #[error("column '{column}' row {row}: value incompatible with {storage} storage")]
    StorageMismatch {
        column: String,
        storage: StorageType,
        row: usize,
    },
}
