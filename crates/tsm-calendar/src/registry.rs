//! Market-id → calendar lookup.
//!
//! Ids are case-insensitive: they are trimmed and upper-cased before lookup,
//! so `"xnys"`, `" XNYS "` and `"XNYS"` all resolve to the same calendar.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::calendar::MarketCalendar;
use crate::provider::{CalendarError, CalendarProvider, MarketInfo};

/// Canonical ids of the built-in markets.
pub const XNYS: &str = "XNYS";
pub const XNAS: &str = "XNAS";
pub const WEEKDAYS: &str = "WEEKDAYS";

/// In-memory calendar provider keyed by market id.
#[derive(Clone, Debug, Default)]
pub struct CalendarRegistry {
    calendars: BTreeMap<String, MarketCalendar>,
    /// alias → canonical id
    aliases: BTreeMap<String, String>,
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

impl CalendarRegistry {
    /// Empty registry; every lookup fails with `UnknownMarket`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `XNYS` (`NYSE`), `XNAS` (`NASDAQ`) and `WEEKDAYS`.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        reg.insert(XNYS, MarketCalendar::us_equities());
        reg.insert(XNAS, MarketCalendar::us_equities());
        reg.insert(WEEKDAYS, MarketCalendar::weekdays(chrono_tz::UTC));
        // Targets were inserted just above.
        let _ = reg.alias("NYSE", XNYS);
        let _ = reg.alias("NASDAQ", XNAS);
        reg
    }

    /// Register (or replace) the calendar for `id`.
    ///
    /// Registering an id that was previously an alias turns it into a
    /// standalone market.
    pub fn insert(&mut self, id: &str, calendar: MarketCalendar) {
        let id = normalize_id(id);
        self.aliases.remove(&id);
        self.calendars.insert(id, calendar);
    }

    /// Make `alias` resolve to the existing market `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), CalendarError> {
        let target = self.canonical_id(target)?;
        self.aliases.insert(normalize_id(alias), target);
        Ok(())
    }

    /// Resolve `market` (id or alias) to its canonical id.
    pub fn canonical_id(&self, market: &str) -> Result<String, CalendarError> {
        let id = normalize_id(market);
        if self.calendars.contains_key(&id) {
            return Ok(id);
        }
        self.aliases
            .get(&id)
            .cloned()
            .ok_or_else(|| CalendarError::UnknownMarket(market.trim().to_string()))
    }

    pub fn get(&self, market: &str) -> Result<&MarketCalendar, CalendarError> {
        let id = self.canonical_id(market)?;
        self.calendars
            .get(&id)
            .ok_or(CalendarError::UnknownMarket(id))
    }

    pub fn contains(&self, market: &str) -> bool {
        self.canonical_id(market).is_ok()
    }
}

impl CalendarProvider for CalendarRegistry {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn sessions(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        Ok(self.get(market)?.sessions_between(start, end))
    }

    fn holidays(&self, market: &str) -> Result<BTreeSet<NaiveDate>, CalendarError> {
        Ok(self.get(market)?.holidays().clone())
    }

    fn markets(&self) -> Vec<MarketInfo> {
        self.calendars
            .iter()
            .map(|(id, cal)| MarketInfo {
                id: id.clone(),
                aliases: self
                    .aliases
                    .iter()
                    .filter(|(_, target)| *target == id)
                    .map(|(alias, _)| alias.clone())
                    .collect(),
                timezone: cal.timezone().name().to_string(),
                holiday_count: cal.holidays().len(),
            })
            .collect()
    }
}
