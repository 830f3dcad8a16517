//! Fixtures for scenario tests across the tsm crates.
//!
//! [`FixtureCalendar`] is a calendar provider whose sessions are listed
//! explicitly per market. It counts queries so tests can assert how often
//! the core reaches out, and can simulate an unavailable backend.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tsm_calendar::{CalendarError, CalendarProvider, MarketInfo};

/// `NaiveDate` from literal parts. Panics on an invalid date.
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap_or_else(|| panic!("invalid date {y}-{m}-{day}"))
}

/// Monday–Friday dates in `[start, end]` not listed in `closed`.
pub fn weekday_sessions(
    start: NaiveDate,
    end: NaiveDate,
    closed: &BTreeSet<NaiveDate>,
) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) && !closed.contains(&day) {
            out.push(day);
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

#[derive(Debug, Default)]
struct FixtureMarket {
    sessions: BTreeSet<NaiveDate>,
    holidays: BTreeSet<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct FixtureCalendar {
    markets: BTreeMap<String, FixtureMarket>,
    /// market id → failure message
    unavailable: BTreeMap<String, String>,
    session_queries: AtomicUsize,
}

impl FixtureCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Market with exactly `sessions`; `holidays` is what `holidays()` reports.
    pub fn with_sessions<S, H>(mut self, id: &str, sessions: S, holidays: H) -> Self
    where
        S: IntoIterator<Item = NaiveDate>,
        H: IntoIterator<Item = NaiveDate>,
    {
        self.markets.insert(
            id.to_string(),
            FixtureMarket {
                sessions: sessions.into_iter().collect(),
                holidays: holidays.into_iter().collect(),
            },
        );
        self
    }

    /// Mon–Fri market over `[start, end]` closed on `holidays`.
    pub fn with_weekdays<H>(self, id: &str, start: NaiveDate, end: NaiveDate, holidays: H) -> Self
    where
        H: IntoIterator<Item = NaiveDate>,
    {
        let holidays: BTreeSet<NaiveDate> = holidays.into_iter().collect();
        let sessions = weekday_sessions(start, end, &holidays);
        self.with_sessions(id, sessions, holidays)
    }

    /// Every query for `id` fails with `CalendarError::Unavailable(msg)`.
    pub fn with_unavailable(mut self, id: &str, msg: &str) -> Self {
        self.unavailable.insert(id.to_string(), msg.to_string());
        self
    }

    /// Number of `sessions()` calls served so far (including failures).
    pub fn session_queries(&self) -> usize {
        self.session_queries.load(Ordering::SeqCst)
    }

    fn market(&self, id: &str) -> Result<&FixtureMarket, CalendarError> {
        if let Some(msg) = self.unavailable.get(id) {
            return Err(CalendarError::Unavailable(msg.clone()));
        }
        self.markets
            .get(id)
            .ok_or_else(|| CalendarError::UnknownMarket(id.to_string()))
    }
}

impl CalendarProvider for FixtureCalendar {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn sessions(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        self.session_queries.fetch_add(1, Ordering::SeqCst);
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.market(market)?.sessions.range(start..=end).copied().collect())
    }

    fn holidays(&self, market: &str) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        Ok(self.market(market)?.holidays.clone())
    }

    fn markets(&self) -> Vec<MarketInfo> {
        self.markets
            .iter()
            .map(|(id, m)| MarketInfo {
                id: id.clone(),
                aliases: Vec::new(),
                timezone: "UTC".to_string(),
                holiday_count: m.holidays.len(),
            })
            .collect()
    }
}
