//! Short-week classification.
//!
//! A "short week" is a Monday–Friday span with 1–4 sessions. Weeks are
//! always evaluated in full, even when the query range only clips them, so
//! the query range is widened to the enclosing Monday..Friday before the
//! schedule is fetched.
//!
//! Every trading date in the query range receives exactly one [`WeekClass`]:
//! `Short` wins over `WeekBeforeShort`, which wins over `Regular`. When two
//! short weeks are adjacent, the earlier one stays `Short`.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;
use tsm_calendar::CalendarProvider;

use crate::selection::{Selection, WeekClass};
use crate::{GridError, WeekDescriptor};

/// Sessions per full Mon–Fri week.
pub const FULL_WEEK_SESSIONS: usize = 5;

// ---------------------------------------------------------------------------
// WeekClassification
// ---------------------------------------------------------------------------

/// Classifier output for one query range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekClassification {
    /// Short weeks overlapping the range, ascending by `week_start`.
    pub descriptors: Vec<WeekDescriptor>,
    /// All sessions inside the query range, in schedule order.
    pub sessions: Vec<NaiveDate>,
    pub short: BTreeSet<NaiveDate>,
    pub week_before_short: BTreeSet<NaiveDate>,
    pub regular: BTreeSet<NaiveDate>,
}

impl WeekClassification {
    /// Label of `date`, or `None` if it is not a session in the query range.
    pub fn class_of(&self, date: NaiveDate) -> Option<WeekClass> {
        if self.short.contains(&date) {
            Some(WeekClass::Short)
        } else if self.week_before_short.contains(&date) {
            Some(WeekClass::WeekBeforeShort)
        } else if self.regular.contains(&date) {
            Some(WeekClass::Regular)
        } else {
            None
        }
    }

    pub fn dates_of(&self, class: WeekClass) -> &BTreeSet<NaiveDate> {
        match class {
            WeekClass::Short => &self.short,
            WeekClass::WeekBeforeShort => &self.week_before_short,
            WeekClass::Regular => &self.regular,
        }
    }

    /// Union of the date sets named by `selection`.
    pub fn dates_for(&self, selection: &Selection<WeekClass>) -> BTreeSet<NaiveDate> {
        WeekClass::ALL
            .iter()
            .filter(|c| selection.contains(c))
            .flat_map(|c| self.dates_of(*c).iter().copied())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Range helpers
// ---------------------------------------------------------------------------

/// Nearest Monday on or before `date`.
pub fn week_monday(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

/// Nearest Friday on or after `date`.
pub fn friday_on_or_after(date: NaiveDate) -> Option<NaiveDate> {
    let wd = date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(u64::from((4 + 7 - wd) % 7)))
}

/// `[start, end]` widened to whole Mon–Fri weeks.
pub fn extended_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), GridError> {
    if start > end {
        return Err(GridError::InvalidRange { start, end });
    }
    match (week_monday(start), friday_on_or_after(end)) {
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(GridError::InvalidRange { start, end }),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Fetch the extended schedule from `provider` and classify `[start, end]`.
pub fn classify(
    provider: &dyn CalendarProvider,
    market: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<WeekClassification, GridError> {
    let (ext_start, ext_end) = extended_range(start, end)?;
    let schedule = provider.sessions(market, ext_start, ext_end)?;
    let holidays = provider.holidays(market)?;

    let out = classify_schedule(&schedule, &holidays, start, end)?;
    debug!(
        market,
        %start,
        %end,
        short_weeks = out.descriptors.len(),
        short = out.short.len(),
        week_before_short = out.week_before_short.len(),
        regular = out.regular.len(),
        "classified weeks"
    );
    Ok(out)
}

/// Short-week descriptors for `[start, end]`.
pub fn classify_weeks(
    provider: &dyn CalendarProvider,
    market: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<WeekDescriptor>, GridError> {
    Ok(classify(provider, market, start, end)?.descriptors)
}

/// Classify `[start, end]` against an already-fetched schedule.
///
/// `schedule` must cover at least the extended Mon..Fri range of the query.
pub fn classify_schedule(
    schedule: &[NaiveDate],
    holidays: &BTreeSet<NaiveDate>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<WeekClassification, GridError> {
    let (ext_start, ext_end) = extended_range(start, end)?;
    let in_range = |d: &NaiveDate| *d >= start && *d <= end;

    let mut descriptors = Vec::new();
    let mut week_start = ext_start;
    while week_start <= ext_end {
        let Some(week_end) = week_start.checked_add_days(Days::new(4)) else {
            break;
        };

        let full_week: Vec<NaiveDate> = sessions_in(schedule, week_start, week_end).collect();
        let overlaps = week_start <= end && week_end >= start;

        if overlaps && !full_week.is_empty() && full_week.len() < FULL_WEEK_SESSIONS {
            let trading_dates: Vec<NaiveDate> =
                full_week.iter().copied().filter(|d| in_range(d)).collect();
            if !trading_dates.is_empty() {
                descriptors.push(WeekDescriptor {
                    week_start,
                    week_end,
                    trading_day_count: full_week.len(),
                    trading_dates,
                    holidays: holidays.range(week_start..=week_end).copied().collect(),
                });
            }
        }

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    let short: BTreeSet<NaiveDate> = descriptors
        .iter()
        .flat_map(|w| w.trading_dates.iter().copied())
        .collect();

    let mut week_before_short = BTreeSet::new();
    for w in &descriptors {
        let prev = w
            .week_start
            .checked_sub_days(Days::new(7))
            .zip(w.week_start.checked_sub_days(Days::new(3)));
        if let Some((prev_start, prev_end)) = prev {
            week_before_short.extend(
                sessions_in(schedule, prev_start, prev_end)
                    .filter(|d| in_range(d) && !short.contains(d)),
            );
        }
    }

    let sessions: Vec<NaiveDate> = schedule.iter().copied().filter(|d| in_range(d)).collect();
    let regular = sessions
        .iter()
        .copied()
        .filter(|d| !short.contains(d) && !week_before_short.contains(d))
        .collect();

    Ok(WeekClassification {
        descriptors,
        sessions,
        short,
        week_before_short,
        regular,
    })
}

fn sessions_in(
    schedule: &[NaiveDate],
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = NaiveDate> + '_ {
    schedule.iter().copied().filter(move |d| *d >= from && *d <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Weekdays in `[from, to]` minus `closed`.
    fn weekday_schedule(from: NaiveDate, to: NaiveDate, closed: &[NaiveDate]) -> Vec<NaiveDate> {
        from.iter_days()
            .take_while(|x| *x <= to)
            .filter(|x| !matches!(x.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|x| !closed.contains(x))
            .collect()
    }

    #[test]
    fn extended_range_snaps_to_monday_and_friday() {
        // Wed 2024-01-03 .. Sat 2024-01-13
        let (s, e) = extended_range(d(2024, 1, 3), d(2024, 1, 13)).unwrap();
        assert_eq!(s, d(2024, 1, 1));
        assert_eq!(e, d(2024, 1, 19));
        assert_eq!(s.weekday(), Weekday::Mon);
        assert_eq!(e.weekday(), Weekday::Fri);
    }

    #[test]
    fn extended_range_keeps_aligned_bounds() {
        let (s, e) = extended_range(d(2024, 1, 8), d(2024, 1, 12)).unwrap();
        assert_eq!((s, e), (d(2024, 1, 8), d(2024, 1, 12)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = extended_range(d(2024, 2, 1), d(2024, 1, 1)).unwrap_err();
        assert_eq!(err.code(), "INVALID_RANGE");
    }

    #[test]
    fn wednesday_holiday_makes_week_short() {
        let holiday = d(2024, 1, 3);
        let schedule = weekday_schedule(d(2023, 12, 25), d(2024, 1, 12), &[holiday]);
        let holidays: BTreeSet<_> = [holiday].into_iter().collect();

        let c = classify_schedule(&schedule, &holidays, d(2023, 12, 25), d(2024, 1, 12)).unwrap();
        assert_eq!(c.descriptors.len(), 1);
        let w = &c.descriptors[0];
        assert_eq!(w.week_start, d(2024, 1, 1));
        assert_eq!(w.week_end, d(2024, 1, 5));
        assert_eq!(w.trading_day_count, 4);
        assert_eq!(w.holidays, holidays);

        assert_eq!(c.class_of(d(2024, 1, 2)), Some(WeekClass::Short));
        assert_eq!(c.class_of(d(2023, 12, 27)), Some(WeekClass::WeekBeforeShort));
        assert_eq!(c.class_of(d(2024, 1, 9)), Some(WeekClass::Regular));
        assert_eq!(c.class_of(holiday), None);
    }

    #[test]
    fn count_uses_full_week_but_dates_are_clipped() {
        // Short week Mon 01-01 (closed) .. Fri 01-05; query starts Thu 01-04.
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 1, 12), &[d(2024, 1, 1)]);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 4), d(2024, 1, 10))
            .unwrap();
        let w = &c.descriptors[0];
        assert_eq!(w.trading_day_count, 4);
        assert_eq!(w.trading_dates, vec![d(2024, 1, 4), d(2024, 1, 5)]);
    }

    #[test]
    fn short_week_touching_range_only_on_weekend_is_dropped() {
        // Query is Sat 01-06 .. Sun 01-07: the week 01-01 overlaps by span but
        // none of its sessions fall inside the range.
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 1, 12), &[d(2024, 1, 1)]);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 6), d(2024, 1, 7))
            .unwrap();
        assert!(c.descriptors.is_empty());
        assert!(c.sessions.is_empty());
    }

    #[test]
    fn closed_week_is_not_short() {
        let closed: Vec<NaiveDate> = weekday_schedule(d(2024, 1, 8), d(2024, 1, 12), &[]);
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 1, 19), &closed);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 1), d(2024, 1, 19))
            .unwrap();
        assert!(c.descriptors.is_empty());
        assert!(c.week_before_short.is_empty());
        assert_eq!(c.regular.len(), 10);
    }

    #[test]
    fn adjacent_short_weeks_keep_short_label() {
        // Two consecutive short weeks: Mon 01-08 and Mon 01-15 closed.
        let closed = [d(2024, 1, 8), d(2024, 1, 15)];
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 1, 19), &closed);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 1), d(2024, 1, 19))
            .unwrap();

        assert_eq!(c.descriptors.len(), 2);
        // The week of 01-08 precedes the short week of 01-15 but is itself short.
        assert_eq!(c.class_of(d(2024, 1, 9)), Some(WeekClass::Short));
        assert!(c.week_before_short.iter().all(|x| *x < d(2024, 1, 8)));
        assert!(c.short.is_disjoint(&c.week_before_short));
    }

    #[test]
    fn classes_partition_sessions() {
        let closed = [d(2024, 1, 3), d(2024, 1, 15), d(2024, 2, 19)];
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 3, 1), &closed);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 1), d(2024, 3, 1))
            .unwrap();

        let union = c.dates_for(&Selection::All);
        let sessions: BTreeSet<NaiveDate> = c.sessions.iter().copied().collect();
        assert_eq!(union, sessions);
        assert_eq!(
            c.short.len() + c.week_before_short.len() + c.regular.len(),
            sessions.len()
        );
    }

    #[test]
    fn week_before_short_is_clipped_to_range() {
        // Short week 01-08; the week before (01-01..01-05) is only half inside.
        let schedule = weekday_schedule(d(2024, 1, 1), d(2024, 1, 12), &[d(2024, 1, 10)]);
        let c = classify_schedule(&schedule, &BTreeSet::new(), d(2024, 1, 4), d(2024, 1, 12))
            .unwrap();
        let expected: BTreeSet<_> = [d(2024, 1, 4), d(2024, 1, 5)].into_iter().collect();
        assert_eq!(c.week_before_short, expected);
    }
}
