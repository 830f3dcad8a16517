//! Filter vocabularies: week classes, trading weekdays, months, and the
//! `All | Only(set)` selection wrapper used for each of them.
//!
//! Parsing helpers accept the comma-separated forms used by the CLI flags
//! and daemon query strings (`"1,2,12"`, `"mon,wed"`, `"short,regular"`).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::GridError;

// ---------------------------------------------------------------------------
// WeekClass
// ---------------------------------------------------------------------------

/// Label attached to a trading date by the short-week classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekClass {
    /// Date lies in a Mon–Fri week with 1–4 sessions.
    Short,
    /// Date lies in the calendar week immediately before a short week.
    WeekBeforeShort,
    /// Everything else.
    Regular,
}

impl WeekClass {
    pub const ALL: [WeekClass; 3] = [
        WeekClass::Short,
        WeekClass::WeekBeforeShort,
        WeekClass::Regular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekClass::Short => "short",
            WeekClass::WeekBeforeShort => "week_before_short",
            WeekClass::Regular => "regular",
        }
    }

    pub fn parse(s: &str) -> Result<Self, GridError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "short" | "short_week" => Ok(WeekClass::Short),
            "week_before_short" | "before_short" | "pre_short" => Ok(WeekClass::WeekBeforeShort),
            "regular" => Ok(WeekClass::Regular),
            other => Err(GridError::InvalidFilter(format!(
                "unknown week type '{other}'. expected one of: short | week_before_short | regular"
            ))),
        }
    }
}

impl fmt::Display for WeekClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TradingWeekday
// ---------------------------------------------------------------------------

/// Monday–Friday; index 0 is Monday.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TradingWeekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl TradingWeekday {
    pub const ALL: [TradingWeekday; 5] = [
        TradingWeekday::Mon,
        TradingWeekday::Tue,
        TradingWeekday::Wed,
        TradingWeekday::Thu,
        TradingWeekday::Fri,
    ];

    /// `None` for Saturday and Sunday.
    pub fn from_chrono(wd: Weekday) -> Option<Self> {
        Self::from_index(wd.num_days_from_monday())
    }

    pub fn of(date: NaiveDate) -> Option<Self> {
        Self::from_chrono(date.weekday())
    }

    pub fn from_index(i: u32) -> Option<Self> {
        Self::ALL.get(i as usize).copied()
    }

    pub fn index(&self) -> u32 {
        *self as u32
    }

    pub fn name(&self) -> &'static str {
        match self {
            TradingWeekday::Mon => "Monday",
            TradingWeekday::Tue => "Tuesday",
            TradingWeekday::Wed => "Wednesday",
            TradingWeekday::Thu => "Thursday",
            TradingWeekday::Fri => "Friday",
        }
    }

    /// Accepts an index (`"0"`..`"4"`), a full name or a 3-letter prefix.
    pub fn parse(s: &str) -> Result<Self, GridError> {
        let t = s.trim().to_ascii_lowercase();
        if let Ok(i) = t.parse::<u32>() {
            return Self::from_index(i).ok_or_else(|| {
                GridError::InvalidFilter(format!("weekday index {i} out of range 0..=4"))
            });
        }
        Self::ALL
            .iter()
            .copied()
            .find(|wd| {
                let name = wd.name().to_ascii_lowercase();
                t.len() >= 3 && name.starts_with(&t)
            })
            .ok_or_else(|| {
                GridError::InvalidFilter(format!(
                    "unknown weekday '{}'. expected Monday..Friday or 0..4",
                    s.trim()
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Either every value of a vocabulary, or an explicit non-empty subset.
///
/// An empty explicit set means `All`: an empty choice is "no filter",
/// never "match nothing". The constructors normalize it away, and
/// [`Selection::contains`] / [`Selection::is_all`] treat a hand-built
/// `Only(∅)` the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    pub fn only<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let set: BTreeSet<T> = items.into_iter().collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    pub fn contains(&self, v: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.is_empty() || set.contains(v),
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.is_empty(),
        }
    }

    /// The explicit subset, or `None` when every value passes.
    pub fn explicit(&self) -> Option<&BTreeSet<T>> {
        match self {
            Selection::Only(set) if !set.is_empty() => Some(set),
            _ => None,
        }
    }

    /// `Only` collapses to `All` when it names every value in `universe`.
    fn saturate(self, universe: usize) -> Self {
        match self {
            Selection::Only(set) if set.len() >= universe => Selection::All,
            other => other,
        }
    }
}

impl Selection<u32> {
    /// Rejects month numbers outside 1..=12.
    pub fn check_months(&self) -> Result<(), GridError> {
        let bad = self
            .explicit()
            .and_then(|set| set.iter().find(|m| !(1..=12).contains(*m)));
        match bad {
            Some(bad) => Err(GridError::InvalidFilter(format!(
                "month {bad} out of range 1..=12"
            ))),
            None => Ok(()),
        }
    }

    /// Calendar months, 1 = January.
    pub fn months<I>(items: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = u32>,
    {
        let sel = Selection::only(items);
        sel.check_months()?;
        Ok(sel.saturate(12))
    }
}

impl Selection<TradingWeekday> {
    pub fn weekdays<I>(items: I) -> Self
    where
        I: IntoIterator<Item = TradingWeekday>,
    {
        Selection::only(items).saturate(TradingWeekday::ALL.len())
    }
}

impl Selection<WeekClass> {
    pub fn week_types<I>(items: I) -> Self
    where
        I: IntoIterator<Item = WeekClass>,
    {
        Selection::only(items).saturate(WeekClass::ALL.len())
    }
}

// ---------------------------------------------------------------------------
// Parsing (comma-separated lists)
// ---------------------------------------------------------------------------

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn is_all_token(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("all")
}

/// `"all"`, `""`, or a list of month numbers / names (`"1,feb,March"`).
pub fn parse_months(raw: &str) -> Result<Selection<u32>, GridError> {
    if is_all_token(raw) {
        return Ok(Selection::All);
    }
    let mut out = Vec::new();
    for tok in tokens(raw) {
        let m = match tok.parse::<u32>() {
            Ok(n) => n,
            Err(_) => month_from_name(tok).ok_or_else(|| {
                GridError::InvalidFilter(format!("unknown month '{tok}'"))
            })?,
        };
        out.push(m);
    }
    Selection::months(out)
}

/// `"all"`, `""`, or a list of weekday indices / names (`"0,wed,Friday"`).
pub fn parse_weekdays(raw: &str) -> Result<Selection<TradingWeekday>, GridError> {
    if is_all_token(raw) {
        return Ok(Selection::All);
    }
    let days = tokens(raw)
        .map(TradingWeekday::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Selection::weekdays(days))
}

/// `"all"`, `""`, or a list of week classes (`"short,before-short"`).
pub fn parse_week_types(raw: &str) -> Result<Selection<WeekClass>, GridError> {
    if is_all_token(raw) {
        return Ok(Selection::All);
    }
    let classes = tokens(raw)
        .map(WeekClass::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Selection::week_types(classes))
}

/// English month name, 1 = "January".
pub fn month_name(m: u32) -> Option<&'static str> {
    u8::try_from(m)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

fn month_from_name(s: &str) -> Option<u32> {
    let t = s.to_ascii_lowercase();
    if t.len() < 3 {
        return None;
    }
    (1..=12).find(|m| {
        month_name(*m)
            .map(|name| name.to_ascii_lowercase().starts_with(&t))
            .unwrap_or(false)
    })
}
