//! Datetime recognition for string-typed columns.
//!
//! Detection runs three stages in a fixed order:
//!
//! 1. every pattern of [`COMMON_PATTERNS`] is tried against the sample and the
//!    best success ratio is kept (ties keep the earlier pattern);
//! 2. if no pattern reaches [`ACCEPT_RATIO`], the share of values that merely
//!    look date-like is measured and anything under [`HINT_CUTOFF`] is rejected;
//! 3. otherwise the sample is run through [`parse_free_form`] and accepted at
//!    [`ACCEPT_RATIO`].

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Minimum share of parsed values for a column to count as datetime.
pub const ACCEPT_RATIO: f64 = 0.8;
/// Below this share of date-looking values the free-form stage is skipped.
pub const HINT_CUTOFF: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Date,
    DateTime,
    Zoned,
}

/// A strftime-style pattern and the shape of value it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatetimePattern {
    pub format: &'static str,
    kind: PatternKind,
}

impl DatetimePattern {
    const fn date(format: &'static str) -> Self {
        Self {
            format,
            kind: PatternKind::Date,
        }
    }

    const fn datetime(format: &'static str) -> Self {
        Self {
            format,
            kind: PatternKind::DateTime,
        }
    }

    const fn zoned(format: &'static str) -> Self {
        Self {
            format,
            kind: PatternKind::Zoned,
        }
    }

    /// Parses `value` with this pattern. Offsets are normalised to UTC.
    ///
    /// `%Y` must consume a full four-digit year; chrono alone would read "24"
    /// as year 24.
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        let parsed = self.parse_unchecked(value)?;
        if self.format.contains("%Y") && parsed.year() < 1000 {
            return None;
        }
        Some(parsed)
    }

    fn parse_unchecked(&self, value: &str) -> Option<NaiveDateTime> {
        match self.kind {
            PatternKind::Date => NaiveDate::parse_from_str(value, self.format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            PatternKind::DateTime => NaiveDateTime::parse_from_str(value, self.format).ok(),
            PatternKind::Zoned => {
                let normalized = match value.strip_suffix(['Z', 'z']) {
                    Some(stem) => format!("{stem}+00:00"),
                    None => value.to_string(),
                };
                DateTime::parse_from_str(&normalized, self.format)
                    .ok()
                    .map(|dt| dt.naive_utc())
            }
        }
    }
}

/// Explicit patterns tried first, in priority order.
pub const COMMON_PATTERNS: &[DatetimePattern] = &[
    DatetimePattern::date("%Y-%m-%d"),
    DatetimePattern::date("%Y/%m/%d"),
    DatetimePattern::date("%Y.%m.%d"),
    DatetimePattern::datetime("%Y-%m-%d %H:%M:%S"),
    DatetimePattern::datetime("%Y/%m/%d %H:%M:%S"),
    DatetimePattern::datetime("%Y.%m.%d %H:%M:%S"),
    DatetimePattern::datetime("%Y-%m-%dT%H:%M:%S"),
    DatetimePattern::zoned("%Y-%m-%dT%H:%M:%S%#z"),
    DatetimePattern::datetime("%Y-%m-%dT%H:%M:%S%.f"),
    DatetimePattern::zoned("%Y-%m-%dT%H:%M:%S%.f%#z"),
    DatetimePattern::date("%d/%m/%Y"),
    DatetimePattern::datetime("%d/%m/%Y %H:%M:%S"),
    DatetimePattern::date("%d.%m.%Y"),
    DatetimePattern::datetime("%d.%m.%Y %H:%M:%S"),
    DatetimePattern::date("%m/%d/%Y"),
    DatetimePattern::datetime("%m/%d/%Y %H:%M:%S"),
];

// Month-first ahead of day-first; two-digit years ahead of `%Y`, which would
// otherwise read "24" as year 24.
const FREE_FORM_PATTERNS: &[DatetimePattern] = &[
    DatetimePattern::zoned("%Y-%m-%d %H:%M:%S%.f%#z"),
    DatetimePattern::zoned("%Y-%m-%dT%H:%M%#z"),
    DatetimePattern::datetime("%Y-%m-%d %H:%M:%S%.f"),
    DatetimePattern::datetime("%Y-%m-%dT%H:%M:%S%.f"),
    DatetimePattern::datetime("%Y/%m/%d %H:%M:%S%.f"),
    DatetimePattern::datetime("%Y.%m.%d %H:%M:%S%.f"),
    DatetimePattern::datetime("%Y-%m-%d %H:%M"),
    DatetimePattern::datetime("%Y-%m-%dT%H:%M"),
    DatetimePattern::datetime("%Y/%m/%d %H:%M"),
    DatetimePattern::datetime("%m/%d/%Y %H:%M:%S%.f"),
    DatetimePattern::datetime("%m/%d/%Y %H:%M"),
    DatetimePattern::datetime("%m/%d/%Y %I:%M:%S %p"),
    DatetimePattern::datetime("%m/%d/%Y %I:%M %p"),
    DatetimePattern::datetime("%d/%m/%Y %H:%M:%S%.f"),
    DatetimePattern::datetime("%d/%m/%Y %H:%M"),
    DatetimePattern::datetime("%d.%m.%Y %H:%M:%S"),
    DatetimePattern::datetime("%d-%m-%Y %H:%M:%S"),
    DatetimePattern::datetime("%d %b %Y %H:%M:%S"),
    DatetimePattern::datetime("%b %d %Y %H:%M:%S"),
    DatetimePattern::date("%Y-%m-%d"),
    DatetimePattern::date("%Y/%m/%d"),
    DatetimePattern::date("%Y.%m.%d"),
    DatetimePattern::date("%m/%d/%y"),
    DatetimePattern::date("%d/%m/%y"),
    DatetimePattern::date("%m/%d/%Y"),
    DatetimePattern::date("%d/%m/%Y"),
    DatetimePattern::date("%m-%d-%Y"),
    DatetimePattern::date("%d-%m-%Y"),
    DatetimePattern::date("%d.%m.%Y"),
    DatetimePattern::date("%d-%b-%y"),
    DatetimePattern::date("%d-%b-%Y"),
    DatetimePattern::date("%d %b %Y"),
    DatetimePattern::date("%d %B %Y"),
    DatetimePattern::date("%b %d %Y"),
    DatetimePattern::date("%B %d %Y"),
    DatetimePattern::date("%b %d, %Y"),
    DatetimePattern::date("%B %d, %Y"),
    DatetimePattern::date("%a, %d %b %Y"),
    DatetimePattern::date("%A, %B %d, %Y"),
];

static DATE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        (?:\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b)        # 2024-09-14, 2024/09/14, 2024.09.14
        |
        (?:\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b)      # 14/09/2024, 09/14/2024, 14.09.2024
        |
        (?:\b\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})    # 2024-09-14T12:34:56...
        ",
    )
    .expect("date hint pattern is valid")
});

static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}$").expect("year-month pattern is valid"));

/// Parses a value without a known pattern. Returns `None` when nothing fits.
///
/// Anything a [`COMMON_PATTERNS`] entry parses is accepted here too.
pub fn parse_free_form(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Some(parsed) = FREE_FORM_PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(trimmed))
    {
        return Some(parsed);
    }
    if let Some(parsed) = COMMON_PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(trimmed))
    {
        return Some(parsed);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.naive_utc());
    }
    if YEAR_MONTH.is_match(trimmed) {
        return NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0));
    }
    None
}

fn success_ratio<F>(sample: &[&str], mut accept: F) -> f64
where
    F: FnMut(&str) -> bool,
{
    if sample.is_empty() {
        return 0.0;
    }
    let hits = sample.iter().filter(|value| accept(value)).count();
    hits as f64 / sample.len() as f64
}

/// The pattern of `patterns` parsing the largest share of `sample`.
///
/// Ties keep the earlier pattern. Returns `(None, 0.0)` when nothing parses.
pub fn best_pattern(
    sample: &[&str],
    patterns: &'static [DatetimePattern],
) -> (Option<&'static DatetimePattern>, f64) {
    let mut best = None;
    let mut best_ratio = 0.0;
    for pattern in patterns {
        let ratio = success_ratio(sample, |value| pattern.parse(value).is_some());
        if ratio > best_ratio {
            best_ratio = ratio;
            best = Some(pattern);
        }
    }
    (best, best_ratio)
}

/// Share of values containing a date-like token.
pub fn date_hint_ratio(sample: &[&str]) -> f64 {
    success_ratio(sample, |value| DATE_HINT.is_match(value))
}

/// How the detector reached its verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Pattern {
        pattern: &'static DatetimePattern,
        ratio: f64,
    },
    FreeForm {
        ratio: f64,
    },
    Rejected {
        best_ratio: f64,
        hint_ratio: f64,
        free_form_ratio: Option<f64>,
    },
}

impl Detection {
    pub fn is_datetime(&self) -> bool {
        !matches!(self, Detection::Rejected { .. })
    }

    /// The catalogue pattern chosen for the whole column, if stage 1 decided.
    pub fn pattern(&self) -> Option<&'static DatetimePattern> {
        match self {
            Detection::Pattern { pattern, .. } => Some(*pattern),
            _ => None,
        }
    }
}

pub fn detect_datetime(sample: &[&str]) -> Detection {
    if sample.is_empty() {
        return Detection::Rejected {
            best_ratio: 0.0,
            hint_ratio: 0.0,
            free_form_ratio: None,
        };
    }

    let (best, best_ratio) = best_pattern(sample, COMMON_PATTERNS);
    if let Some(pattern) = best
        && best_ratio >= ACCEPT_RATIO
    {
        return Detection::Pattern {
            pattern,
            ratio: best_ratio,
        };
    }

    let hint_ratio = date_hint_ratio(sample);
    if hint_ratio < HINT_CUTOFF {
        return Detection::Rejected {
            best_ratio,
            hint_ratio,
            free_form_ratio: None,
        };
    }

    let free_form_ratio = success_ratio(sample, |value| parse_free_form(value).is_some());
    if free_form_ratio >= ACCEPT_RATIO {
        Detection::FreeForm {
            ratio: free_form_ratio,
        }
    } else {
        Detection::Rejected {
            best_ratio,
            hint_ratio,
            free_form_ratio: Some(free_form_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn iso_dates_select_first_pattern() {
        let sample = ["2024-01-15", "2024-02-20", "2024-03-01"];
        let (pattern, ratio) = best_pattern(&sample, COMMON_PATTERNS);
        assert_eq!(pattern.map(|p| p.format), Some("%Y-%m-%d"));
        assert_eq!(ratio, 1.0);
        assert_eq!(
            detect_datetime(&sample).pattern().map(|p| p.format),
            Some("%Y-%m-%d")
        );
    }

    #[test]
    fn plain_words_have_no_hint() {
        let sample = ["apple", "banana", "cherry"];
        assert_eq!(date_hint_ratio(&sample), 0.0);
        assert_eq!(
            detect_datetime(&sample),
            Detection::Rejected {
                best_ratio: 0.0,
                hint_ratio: 0.0,
                free_form_ratio: None,
            }
        );
    }

    #[test]
    fn zoned_pattern_normalises_to_utc() {
        let pattern = DatetimePattern::zoned("%Y-%m-%dT%H:%M:%S%#z");
        assert_eq!(
            pattern.parse("2024-01-01T08:30:00+02:00"),
            Some(ymd_hms(2024, 1, 1, 6, 30, 0))
        );
        assert_eq!(
            pattern.parse("2024-01-01T08:30:00Z"),
            Some(ymd_hms(2024, 1, 1, 8, 30, 0))
        );
    }

    #[test]
    fn ambiguous_slash_dates_tie_break_to_day_first() {
        let sample = ["01/02/2024", "03/04/2024"];
        let (pattern, ratio) = best_pattern(&sample, COMMON_PATTERNS);
        assert_eq!(pattern.map(|p| p.format), Some("%d/%m/%Y"));
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn free_form_handles_month_names_and_short_years() {
        assert_eq!(
            parse_free_form("15 Jan 2024"),
            Some(ymd_hms(2024, 1, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_free_form("March 3, 2023"),
            Some(ymd_hms(2023, 3, 3, 0, 0, 0))
        );
        assert_eq!(
            parse_free_form("01/02/24"),
            Some(ymd_hms(2024, 1, 2, 0, 0, 0))
        );
        assert_eq!(
            parse_free_form("2024-05"),
            Some(ymd_hms(2024, 5, 1, 0, 0, 0))
        );
        assert_eq!(parse_free_form("not a date"), None);
        assert_eq!(parse_free_form("   "), None);
    }

    #[test]
    fn free_form_stage_runs_when_hint_is_strong() {
        // No explicit pattern matches the minute-precision stamps, but every
        // value carries an ISO date token.
        let sample = ["2024-01-15 10:30", "2024-01-16 11:45", "2024-01-17 09:00"];
        assert_eq!(best_pattern(&sample, COMMON_PATTERNS).1, 0.0);
        assert_eq!(date_hint_ratio(&sample), 1.0);
        assert_eq!(detect_datetime(&sample), Detection::FreeForm { ratio: 1.0 });
    }

    #[test]
    fn free_form_rejects_when_parsing_mostly_fails() {
        let sample = ["ref 2024-01-15 a", "ref 2024-01-16 b", "x", "y", "z"];
        match detect_datetime(&sample) {
            Detection::Rejected {
                hint_ratio,
                free_form_ratio,
                ..
            } => {
                assert!((hint_ratio - 0.4).abs() < 1e-12);
                assert_eq!(free_form_ratio, Some(0.0));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn free_form_reads_compact_and_hour_only_offsets() {
        assert_eq!(
            parse_free_form("2024-01-01T10:00:00+0200"),
            Some(ymd_hms(2024, 1, 1, 8, 0, 0))
        );
        assert_eq!(
            parse_free_form("2024-01-01T10:00:00.5+02"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_milli_opt(8, 0, 0, 500)
        );
    }

    #[test]
    fn empty_sample_is_never_datetime() {
        assert!(!detect_datetime(&[]).is_datetime());
    }
}
