use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    data::{StorageType, Value, format_date, format_iso8601, format_timestamp, to_datetime},
    dataset::{Column, Dataset},
    roles::{RoleMap, datetime_sample},
    temporal,
};

pub const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatetimeReport {
    pub n_cols: usize,
    pub columns: BTreeMap<String, DatetimeProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatetimeProfile {
    pub n_nonnull: usize,
    pub n_null: usize,
    pub pct_null: f64,
    pub min: Option<String>,
    pub max: Option<String>,
    pub examples: Vec<String>,
}

pub fn analyze_datetime(dataset: &Dataset, roles: &RoleMap) -> DatetimeReport {
    let columns = roles
        .datetime
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|column| (column.name().to_string(), profile_column(column)))
        .collect();
    DatetimeReport {
        n_cols: roles.datetime.len(),
        columns,
    }
}

/// Parsed timestamps of `column`. Typed columns are read as-is.
///
/// String columns are read with the catalogue pattern the classifier picks
/// for the column, so every row gets the same day/month order; values that
/// pattern rejects fall back to free-form parsing.
pub fn coerce_column(column: &Column) -> Vec<Option<NaiveDateTime>> {
    match column.storage() {
        StorageType::DateTime => column
            .values()
            .iter()
            .map(|value| match value {
                Some(Value::DateTime(dt)) => Some(*dt),
                _ => None,
            })
            .collect(),
        _ => {
            let pattern = temporal::detect_datetime(&datetime_sample(column)).pattern();
            column
                .values()
                .iter()
                .map(|value| match (pattern, value) {
                    (Some(pattern), Some(Value::String(raw))) => pattern
                        .parse(raw)
                        .or_else(|| temporal::parse_free_form(raw)),
                    _ => to_datetime(value.as_ref()),
                })
                .collect()
        }
    }
}

fn profile_column(column: &Column) -> DatetimeProfile {
    let parsed = coerce_column(column);
    let present = parsed.iter().flatten().copied().collect::<Vec<_>>();
    let n_nonnull = present.len();
    let n_null = parsed.len() - n_nonnull;
    let pct_null = if parsed.is_empty() {
        0.0
    } else {
        n_null as f64 / parsed.len() as f64 * 100.0
    };
    // Date-only columns render their examples without a time part.
    let render: fn(&NaiveDateTime) -> String =
        if present.iter().all(|dt| dt.time() == NaiveTime::MIN) {
            format_date
        } else {
            format_timestamp
        };
    DatetimeProfile {
        n_nonnull,
        n_null,
        pct_null,
        min: present.iter().min().map(format_iso8601),
        max: present.iter().max().map(format_iso8601),
        examples: present
            .iter()
            .take(MAX_EXAMPLES)
            .map(render)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unparsable_strings_count_as_missing() {
        let column = Column::strings(
            "when",
            [Some("2024-03-01"), Some("soon"), None, Some("2024-01-15")],
        );
        let profile = profile_column(&column);
        assert_eq!(profile.n_nonnull, 2);
        assert_eq!(profile.n_null, 2);
        assert_eq!(profile.pct_null, 50.0);
        assert_eq!(profile.min.as_deref(), Some("2024-01-15T00:00:00"));
        assert_eq!(profile.max.as_deref(), Some("2024-03-01T00:00:00"));
        assert_eq!(profile.examples, vec!["2024-03-01", "2024-01-15"]);
    }

    #[test]
    fn typed_columns_pass_through() {
        let stamp = NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let column = Column::datetimes("t", [Some(stamp), None]);
        assert_eq!(coerce_column(&column), vec![Some(stamp), None]);
    }

    #[test]
    fn column_pattern_fixes_day_month_order() {
        let column = Column::strings(
            "d",
            [Some("01/02/2024"), Some("03/02/2024"), Some("15/02/2024")],
        );
        let parsed = coerce_column(&column);
        let first = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        assert_eq!(parsed[0], first);
        assert!(parsed.iter().flatten().all(|dt| dt.format("%m").to_string() == "02"));
    }

    #[test]
    fn timed_values_keep_time_in_examples() {
        let column = Column::strings(
            "t",
            [Some("2024-03-01 00:00:00"), Some("2024-03-02 12:30:00")],
        );
        let profile = profile_column(&column);
        assert_eq!(
            profile.examples,
            vec!["2024-03-01 00:00:00", "2024-03-02 12:30:00"]
        );
    }

    #[test]
    fn all_missing_has_no_range() {
        let column = Column::strings("e", [None::<&str>, None]);
        let profile = profile_column(&column);
        assert_eq!(profile.min, None);
        assert_eq!(profile.max, None);
        assert!(profile.examples.is_empty());
        assert_eq!(profile.pct_null, 100.0);
    }
}
