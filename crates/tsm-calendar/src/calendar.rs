//! Weekday/holiday trading calendars.
//!
//! Deterministic, pure logic. No IO, no wall-clock, no randomness.
//!
//! # Design
//!
//! [`MarketCalendar`] models the common equities shape: every Monday–Friday
//! is a session unless it appears in the calendar's holiday set. Weekends
//! are never sessions. The timezone is carried as metadata for listings and
//! is never used to convert dates; sessions are civil dates in the market's
//! own zone.
//!
//! [`us_equity_holidays`] returns the hardcoded NYSE closure table used by the
//! built-in `XNYS` / `XNAS` markets.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// MarketCalendar
// ---------------------------------------------------------------------------

/// A Monday–Friday calendar with an explicit set of full-day closures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketCalendar {
    timezone: Tz,
    holidays: BTreeSet<NaiveDate>,
}

impl MarketCalendar {
    /// Every weekday is a session; no holidays.
    pub fn weekdays(timezone: Tz) -> Self {
        Self {
            timezone,
            holidays: BTreeSet::new(),
        }
    }

    /// US equities: weekdays in New York, minus [`us_equity_holidays`].
    pub fn us_equities() -> Self {
        Self::weekdays(chrono_tz::America::New_York).with_holidays(us_equity_holidays())
    }

    /// Add closures to this calendar. Weekend dates are accepted and ignored
    /// by [`MarketCalendar::is_trading_day`] (they are closed anyway).
    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays.extend(holidays);
        self
    }

    /// Same sessions, different zone label.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    /// Returns `true` if `date` is a weekday and not a listed holiday.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// All sessions in the inclusive range `[start, end]`, ascending.
    pub fn sessions_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut day = start;
        while day <= end {
            if self.is_trading_day(day) {
                out.push(day);
            }
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Holiday table 2022–2027
// ---------------------------------------------------------------------------

/// NYSE full-day closures (observed dates) for 2022–2027. Extend as needed.
pub fn us_equity_holidays() -> BTreeSet<NaiveDate> {
    // Encoded as (year, month, day) tuples for readability and determinism.
    const HOLIDAYS: &[(i32, u32, u32)] = &[
        // ── 2022 ─────────────────────────────────────────────────────────
        (2022, 1, 17),  // MLK Day
        (2022, 2, 21),  // Presidents' Day
        (2022, 4, 15),  // Good Friday
        (2022, 5, 30),  // Memorial Day
        (2022, 6, 20),  // Juneteenth (observed Mon)
        (2022, 7, 4),   // Independence Day
        (2022, 9, 5),   // Labor Day
        (2022, 11, 24), // Thanksgiving
        (2022, 12, 26), // Christmas (observed Mon)
        // ── 2023 ─────────────────────────────────────────────────────────
        (2023, 1, 2),   // New Year's Day (observed Mon)
        (2023, 1, 16),  // MLK Day
        (2023, 2, 20),  // Presidents' Day
        (2023, 4, 7),   // Good Friday
        (2023, 5, 29),  // Memorial Day
        (2023, 6, 19),  // Juneteenth
        (2023, 7, 4),   // Independence Day
        (2023, 9, 4),   // Labor Day
        (2023, 11, 23), // Thanksgiving
        (2023, 12, 25), // Christmas
        // ── 2024 ─────────────────────────────────────────────────────────
        (2024, 1, 1),   // New Year's Day
        (2024, 1, 15),  // MLK Day
        (2024, 2, 19),  // Presidents' Day
        (2024, 3, 29),  // Good Friday
        (2024, 5, 27),  // Memorial Day
        (2024, 6, 19),  // Juneteenth
        (2024, 7, 4),   // Independence Day
        (2024, 9, 2),   // Labor Day
        (2024, 11, 28), // Thanksgiving
        (2024, 12, 25), // Christmas
        // ── 2025 ─────────────────────────────────────────────────────────
        (2025, 1, 1),   // New Year's Day
        (2025, 1, 9),   // National Day of Mourning (President Carter)
        (2025, 1, 20),  // MLK Day
        (2025, 2, 17),  // Presidents' Day
        (2025, 4, 18),  // Good Friday
        (2025, 5, 26),  // Memorial Day
        (2025, 6, 19),  // Juneteenth
        (2025, 7, 4),   // Independence Day
        (2025, 9, 1),   // Labor Day
        (2025, 11, 27), // Thanksgiving
        (2025, 12, 25), // Christmas
        // ── 2026 ─────────────────────────────────────────────────────────
        (2026, 1, 1),   // New Year's Day
        (2026, 1, 19),  // MLK Day
        (2026, 2, 16),  // Presidents' Day
        (2026, 4, 3),   // Good Friday
        (2026, 5, 25),  // Memorial Day
        (2026, 6, 19),  // Juneteenth
        (2026, 7, 3),   // Independence Day (observed, July 4 falls on Saturday)
        (2026, 9, 7),   // Labor Day
        (2026, 11, 26), // Thanksgiving
        (2026, 12, 25), // Christmas
        // ── 2027 ─────────────────────────────────────────────────────────
        (2027, 1, 1),   // New Year's Day
        (2027, 1, 18),  // MLK Day
        (2027, 2, 15),  // Presidents' Day
        (2027, 3, 26),  // Good Friday
        (2027, 5, 31),  // Memorial Day
        (2027, 6, 18),  // Juneteenth (observed Fri)
        (2027, 7, 5),   // Independence Day (observed Mon)
        (2027, 9, 6),   // Labor Day
        (2027, 11, 25), // Thanksgiving
        (2027, 12, 24), // Christmas (observed Fri)
    ];
    HOLIDAYS
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests (fast, no external dependencies)
// ---------------------------------------------------------------------------
