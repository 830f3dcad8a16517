//! Short-week classification over the built-in NYSE calendar.
//!
//! 2024-12-16 .. 2025-01-24 contains four short weeks, three of them
//! back to back:
//!
//!   week of 12-16  5 sessions                      → week before short
//!   week of 12-23  Wed 12-25 Christmas              → short (4)
//!   week of 12-30  Wed 01-01 New Year's Day         → short (4)
//!   week of 01-06  Thu 01-09 National Day of Mourning → short (4)
//!   week of 01-13  5 sessions                      → week before short
//!   week of 01-20  Mon 01-20 MLK Day                → short (4)

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tsm_calendar::{CalendarRegistry, XNYS};
use tsm_core::{GridEngine, Selection, TimestampFilter, WeekClass};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn classify() -> tsm_core::WeekClassification {
    let reg = CalendarRegistry::with_builtin();
    GridEngine::new(&reg)
        .classify(XNYS, d(2024, 12, 16), d(2025, 1, 24))
        .unwrap()
}

#[test]
fn four_short_weeks_with_holidays() {
    let c = classify();
    let starts: Vec<NaiveDate> = c.descriptors.iter().map(|w| w.week_start).collect();
    assert_eq!(
        starts,
        vec![d(2024, 12, 23), d(2024, 12, 30), d(2025, 1, 6), d(2025, 1, 20)]
    );
    for w in &c.descriptors {
        assert_eq!(w.trading_day_count, 4, "week {}", w.week_start);
        assert_eq!(w.holidays.len(), 1, "week {}", w.week_start);
        assert_eq!(w.week_end, w.week_start + chrono::Days::new(4));
    }
    assert!(c.descriptors[1].holidays.contains(&d(2025, 1, 1)));
}

#[test]
fn back_to_back_short_weeks_are_labelled_short() {
    let c = classify();
    assert_eq!(c.short.len(), 16);
    // Only the two full weeks are "before short"; the short weeks that
    // precede another short week keep their Short label.
    let before: BTreeSet<NaiveDate> = c.week_before_short.clone();
    assert_eq!(before.len(), 10);
    assert!(before.contains(&d(2024, 12, 16)));
    assert!(before.contains(&d(2025, 1, 17)));
    assert_eq!(c.class_of(d(2024, 12, 27)), Some(WeekClass::Short));
    assert!(c.regular.is_empty());
}

#[test]
fn short_week_filter_emits_grid_only_on_short_days() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    let f = TimestampFilter::new(d(2024, 12, 16), d(2025, 1, 24), 60)
        .with_week_types(Selection::week_types([WeekClass::Short]));

    let grid = engine.generate_timestamps("nyse", &f).unwrap();
    assert_eq!(grid.admissible_days, 16);
    // 09:30..=15:30 hourly = 7 instants per day.
    assert_eq!(grid.len(), 16 * 7);
    assert_eq!(grid.records[0].to_string(), "2024-12-23 09:32");
    assert_eq!(grid.records[1].to_string(), "2024-12-23 10:30");
}
