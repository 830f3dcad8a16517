//! Date-set filter: week type, month and weekday predicates.
//!
//! All predicates are conjunctive. A predicate set to `Selection::All` is a
//! no-op; it never empties the result on its own.

use chrono::{Datelike, NaiveDate};

use crate::selection::TradingWeekday;
use crate::weeks::WeekClassification;
use crate::TimestampFilter;

/// Sessions of `classification` that survive `filter`, in schedule order.
pub fn admissible_dates(
    classification: &WeekClassification,
    filter: &TimestampFilter,
) -> Vec<NaiveDate> {
    let by_week_type = (!filter.week_types.is_all())
        .then(|| classification.dates_for(&filter.week_types));

    classification
        .sessions
        .iter()
        .copied()
        .filter(|d| by_week_type.as_ref().map_or(true, |set| set.contains(d)))
        .filter(|d| filter.months.contains(&d.month()))
        .filter(|d| match TradingWeekday::of(*d) {
            Some(wd) => filter.weekdays.contains(&wd),
            // Weekend sessions only pass an unrestricted weekday filter.
            None => filter.weekdays.is_all(),
        })
        .collect()
}
