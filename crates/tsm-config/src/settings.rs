//! Typed view of the merged configuration document.
//!
//! Every section is optional; an empty document yields the built-in
//! defaults (XNYS, 5-minute grid, 09:30 open, 15:59 cutoff, 2-minute shift).

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tsm_calendar::{CalendarRegistry, MarketCalendar};
use tsm_core::grid::{check_interval, DEFAULT_OPEN_OFFSET_MINUTES};
use tsm_core::SessionClock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub defaults: Defaults,
    pub session: SessionSettings,
    /// Market id → overrides or new calendars layered on the built-ins.
    pub markets: BTreeMap<String, MarketSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub market: String,
    pub interval_minutes: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            market: tsm_calendar::XNYS.to_string(),
            interval_minutes: 5,
        }
    }
}

/// Clock strings are `HH:MM` (or `HH:MM:SS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub open: String,
    pub cutoff: String,
    pub open_offset_minutes: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            open: "09:30".to_string(),
            cutoff: "15:59".to_string(),
            open_offset_minutes: DEFAULT_OPEN_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// IANA zone name, e.g. `America/New_York`.
    pub timezone: Option<String>,
    /// Market whose holidays and timezone are inherited.
    pub extends: Option<String>,
    pub holidays: Vec<NaiveDate>,
    pub aliases: Vec<String>,
}

impl Settings {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let settings: Settings = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: settings do not match the expected shape")?;
        check_interval(settings.defaults.interval_minutes)
            .map_err(|e| anyhow!("CONFIG_INVALID: defaults.interval_minutes: {e}"))?;
        Ok(settings)
    }

    pub fn session_clock(&self) -> Result<SessionClock> {
        let open = parse_clock("session.open", &self.session.open)?;
        let cutoff = parse_clock("session.cutoff", &self.session.cutoff)?;
        SessionClock::new(open, cutoff, self.session.open_offset_minutes)
            .map_err(|e| anyhow!("CONFIG_INVALID: session: {e}"))
    }

    /// Built-in markets plus everything under `markets`.
    ///
    /// Entries are applied in passes so an `extends` target defined in the
    /// same document is built first. A pass that makes no progress means the
    /// remaining entries extend an unknown market or each other.
    pub fn build_registry(&self) -> Result<CalendarRegistry> {
        let mut reg = CalendarRegistry::with_builtin();
        let mut pending: BTreeMap<String, &MarketSettings> = self
            .markets
            .iter()
            .map(|(id, m)| (normalize(id), m))
            .collect();

        while !pending.is_empty() {
            let ready: Vec<String> = pending
                .iter()
                .filter(|(_, m)| match &m.extends {
                    None => true,
                    Some(target) => {
                        !pending.contains_key(&normalize(target)) && reg.contains(target)
                    }
                })
                .map(|(id, _)| id.clone())
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&String> = pending.keys().collect();
                bail!("CONFIG_INVALID: markets {stuck:?} extend an unknown market or form a cycle");
            }

            for id in ready {
                let Some(m) = pending.remove(&id) else {
                    continue;
                };
                let calendar = build_calendar(&reg, &id, m)?;
                reg.insert(&id, calendar);
                for alias in &m.aliases {
                    reg.alias(alias, &id)
                        .map_err(|e| anyhow!("CONFIG_INVALID: market {id}: alias {alias}: {e}"))?;
                }
            }
        }
        Ok(reg)
    }
}

fn build_calendar(reg: &CalendarRegistry, id: &str, m: &MarketSettings) -> Result<MarketCalendar> {
    let base = match &m.extends {
        Some(target) => reg
            .get(target)
            .map_err(|e| anyhow!("CONFIG_INVALID: market {id}: extends: {e}"))?
            .clone(),
        // Redefining an existing id without `extends` augments it.
        None => match reg.get(id) {
            Ok(existing) => existing.clone(),
            Err(_) => MarketCalendar::weekdays(chrono_tz::UTC),
        },
    };

    let base = match &m.timezone {
        Some(name) => {
            let tz: Tz = name
                .trim()
                .parse()
                .map_err(|e| anyhow!("CONFIG_INVALID: market {id}: timezone {name:?}: {e}"))?;
            base.with_timezone(tz)
        }
        None => base,
    };

    let holidays: BTreeSet<NaiveDate> = m.holidays.iter().copied().collect();
    Ok(base.with_holidays(holidays))
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

fn parse_clock(field: &str, raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| anyhow!("CONFIG_INVALID: {field}: {raw:?} is not HH:MM ({e})"))
}
