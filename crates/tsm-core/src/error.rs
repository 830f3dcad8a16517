use std::fmt;

use chrono::NaiveDate;
use tsm_calendar::CalendarError;

/// Failure of a grid/classification call. Every variant aborts the whole
/// call; no partial output is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// `start > end`, or the range cannot be extended to whole weeks.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// `interval_minutes <= 0`.
    InvalidInterval(i64),
    /// A month / weekday / week-type selection contained an unknown value.
    InvalidFilter(String),
    /// Session open/cutoff/offset do not describe a usable trading day.
    InvalidSessionClock(String),
    /// Propagated from the calendar provider without retry.
    Calendar(CalendarError),
}

impl GridError {
    /// Stable machine-readable code for logs and HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            GridError::InvalidRange { .. } => "INVALID_RANGE",
            GridError::InvalidInterval(_) => "INVALID_INTERVAL",
            GridError::InvalidFilter(_) => "INVALID_FILTER",
            GridError::InvalidSessionClock(_) => "INVALID_SESSION_CLOCK",
            GridError::Calendar(CalendarError::UnknownMarket(_)) => "UNKNOWN_MARKET",
            GridError::Calendar(CalendarError::Unavailable(_)) => "CALENDAR_UNAVAILABLE",
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidRange { start, end } => {
                write!(f, "invalid date range: start {start} is after end {end}")
            }
            GridError::InvalidInterval(m) => {
                write!(f, "invalid interval: {m} minutes (must be > 0)")
            }
            GridError::InvalidFilter(msg) => write!(f, "invalid filter: {msg}"),
            GridError::InvalidSessionClock(msg) => write!(f, "invalid session clock: {msg}"),
            GridError::Calendar(e) => write!(f, "calendar error: {e}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Calendar(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CalendarError> for GridError {
    fn from(e: CalendarError) -> Self {
        GridError::Calendar(e)
    }
}
