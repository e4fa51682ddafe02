//! In-memory table handed to the profiler.
//!
//! A [`Dataset`] is an ordered list of uniquely named [`Column`]s of equal
//! length. Cells are `Option<Value>`; `None` is the missing marker. The
//! profiler only ever borrows a dataset.

use std::collections::HashSet;

use crate::{
    data::{StorageType, Value},
    error::ProfileError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    storage: StorageType,
    values: Vec<Option<Value>>,
}

impl Column {
    /// Builds a column, checking every value against `storage`.
    ///
    /// Float `NaN` cells are stored as missing and integer cells of a float
    /// column are widened.
    pub fn new(
        name: impl Into<String>,
        storage: StorageType,
        values: Vec<Option<Value>>,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        let mut normalized = Vec::with_capacity(values.len());
        for (row, value) in values.into_iter().enumerate() {
            let value = match value {
                Some(value) if !storage.accepts(&value) => {
                    return Err(ProfileError::StorageMismatch {
                        column: name,
                        storage,
                        row,
                    });
                }
                Some(Value::Float(f)) if f.is_nan() => None,
                Some(Value::Integer(i)) if storage == StorageType::Float => {
                    Some(Value::Float(i as f64))
                }
                other => other,
            };
            normalized.push(value);
        }
        Ok(Self {
            name,
            storage,
            values: normalized,
        })
    }

    pub fn integers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self::from_parts(
            name,
            StorageType::Integer,
            values.into_iter().map(|v| v.map(Value::Integer)).collect(),
        )
    }

    pub fn floats<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::from_parts(
            name,
            StorageType::Float,
            values
                .into_iter()
                .map(|v| v.filter(|f| !f.is_nan()).map(Value::Float))
                .collect(),
        )
    }

    pub fn booleans<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        Self::from_parts(
            name,
            StorageType::Boolean,
            values.into_iter().map(|v| v.map(Value::Boolean)).collect(),
        )
    }

    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::from_parts(
            name,
            StorageType::String,
            values
                .into_iter()
                .map(|v| v.map(|s| Value::String(s.into())))
                .collect(),
        )
    }

    pub fn datetimes<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<chrono::NaiveDateTime>>,
    {
        Self::from_parts(
            name,
            StorageType::DateTime,
            values.into_iter().map(|v| v.map(Value::DateTime)).collect(),
        )
    }

    fn from_parts(name: impl Into<String>, storage: StorageType, values: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            storage,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().flatten()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.present().collect::<HashSet<_>>().len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Assembles a dataset, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self, ProfileError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ProfileError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.len() != row_count) {
            return Err(ProfileError::LengthMismatch {
                column: column.name.clone(),
                expected: row_count,
                found: column.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a dataset from raw text cells, inferring each column's storage.
    ///
    /// Missing-value tokens become `None`. Non-missing cells that all parse
    /// as integers give an integer column, then floats, then `true`/`false`
    /// tokens as boolean; anything else stays a string. A column with no
    /// values at all is stored as float. Dates are left as strings.
    pub fn from_text_records<H, R>(headers: &[H], rows: &[R]) -> Result<Self, ProfileError>
    where
        H: AsRef<str>,
        R: AsRef<[String]>,
    {
        for (row_idx, row) in rows.iter().enumerate() {
            let width = row.as_ref().len();
            if width != headers.len() {
                return Err(ProfileError::LengthMismatch {
                    column: format!("row {row_idx}"),
                    expected: headers.len(),
                    found: width,
                });
            }
        }
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cells = rows
                    .iter()
                    .map(|row| {
                        let raw = row.as_ref()[idx].as_str();
                        (!is_missing_token(raw)).then_some(raw)
                    })
                    .collect::<Vec<_>>();
                build_text_column(header.as_ref(), &cells)
            })
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn ensure_not_empty(&self) -> Result<(), ProfileError> {
        if self.columns.is_empty() {
            Err(ProfileError::EmptyDataset)
        } else {
            Ok(())
        }
    }
}

const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

#[derive(Debug, Default)]
struct StorageCandidate {
    non_missing: usize,
    integer_matches: usize,
    float_matches: usize,
    boolean_matches: usize,
}

impl StorageCandidate {
    fn update(&mut self, value: &str) {
        let trimmed = value.trim();
        self.non_missing += 1;
        if trimmed.parse::<i64>().is_ok() {
            self.integer_matches += 1;
        }
        if trimmed.parse::<f64>().is_ok() {
            self.float_matches += 1;
        }
        if parse_boolean_token(trimmed).is_some() {
            self.boolean_matches += 1;
        }
    }

    fn decide(&self) -> StorageType {
        if self.non_missing == 0 {
            StorageType::Float
        } else if self.integer_matches == self.non_missing {
            StorageType::Integer
        } else if self.float_matches == self.non_missing {
            StorageType::Float
        } else if self.boolean_matches == self.non_missing {
            StorageType::Boolean
        } else {
            StorageType::String
        }
    }
}

fn parse_boolean_token(value: &str) -> Option<bool> {
    match value {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn build_text_column(name: &str, cells: &[Option<&str>]) -> Column {
    let mut candidate = StorageCandidate::default();
    for cell in cells.iter().flatten() {
        candidate.update(cell);
    }
    let storage = candidate.decide();
    let values = cells
        .iter()
        .map(|cell| {
            let raw = (*cell)?;
            let trimmed = raw.trim();
            match storage {
                StorageType::Integer => trimmed.parse().ok().map(Value::Integer),
                StorageType::Float => trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| !f.is_nan())
                    .map(Value::Float),
                StorageType::Boolean => parse_boolean_token(trimmed).map(Value::Boolean),
                _ => Some(Value::String(raw.to_string())),
            }
        })
        .collect();
    Column::from_parts(name, storage, values)
}
