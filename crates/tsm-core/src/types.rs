use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::selection::{Selection, TradingWeekday, WeekClass};

/// Output format of a [`TimestampRecord`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// ISO date format used for date-only views.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Single column header of the CSV export.
pub const CSV_HEADER: &str = "OPEN_DATETIME";

// ---------------------------------------------------------------------------
// TimestampRecord
// ---------------------------------------------------------------------------

/// One generated intraday instant (minute precision, market-local clock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampRecord(NaiveDateTime);

impl TimestampRecord {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    pub fn at(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl fmt::Display for TimestampRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for TimestampRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// WeekDescriptor
// ---------------------------------------------------------------------------

/// A Mon–Fri week with 1–4 sessions that overlaps the query range.
///
/// `trading_day_count` counts sessions over the full Monday–Friday span;
/// `trading_dates` only lists the ones inside the query range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeekDescriptor {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub trading_day_count: usize,
    pub trading_dates: Vec<NaiveDate>,
    pub holidays: BTreeSet<NaiveDate>,
}

// ---------------------------------------------------------------------------
// TimestampFilter
// ---------------------------------------------------------------------------

/// Request-scoped filter set. Validation of the range and interval happens
/// when the filter is run, so every entry point reports the same errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval_minutes: i64,
    pub months: Selection<u32>,
    pub weekdays: Selection<TradingWeekday>,
    pub week_types: Selection<WeekClass>,
}

impl TimestampFilter {
    /// No month/weekday/week-type restriction.
    pub fn new(start: NaiveDate, end: NaiveDate, interval_minutes: i64) -> Self {
        Self {
            start,
            end,
            interval_minutes,
            months: Selection::All,
            weekdays: Selection::All,
            week_types: Selection::All,
        }
    }

    pub fn with_months(mut self, months: Selection<u32>) -> Self {
        self.months = months;
        self
    }

    pub fn with_weekdays(mut self, weekdays: Selection<TradingWeekday>) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn with_week_types(mut self, week_types: Selection<WeekClass>) -> Self {
        self.week_types = week_types;
        self
    }

    /// Download name used by the presentation layers.
    pub fn csv_file_name(&self) -> String {
        format!(
            "timestamps_{}_to_{}_{}mins.csv",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.interval_minutes
        )
    }
}

// ---------------------------------------------------------------------------
// TimestampGrid
// ---------------------------------------------------------------------------

/// Non-fatal outcomes worth surfacing to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridWarning {
    /// No trading date survived the filters. Valid, but worth reporting.
    EmptyResult,
}

impl fmt::Display for GridWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridWarning::EmptyResult => {
                f.write_str("no timestamps generated: no trading date matched the filters")
            }
        }
    }
}

/// Output of one generation call, ordered by date then time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimestampGrid {
    pub records: Vec<TimestampRecord>,
    pub admissible_days: usize,
}

impl TimestampGrid {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn warning(&self) -> Option<GridWarning> {
        self.is_empty().then_some(GridWarning::EmptyResult)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.records.iter().map(|r| r.to_string()).collect()
    }

    /// Unique dates carried by the records, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut out: Vec<NaiveDate> = self.records.iter().map(|r| r.date()).collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Format dates as ISO strings.
pub fn iso_dates(dates: &[NaiveDate]) -> Vec<String> {
    dates
        .iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect()
}
