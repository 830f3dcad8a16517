//! Classifier and filter scenarios over an explicit fixture calendar.
//!
//! Market open Monday–Friday with a single Wednesday holiday on 2024-01-03:
//!
//!   week of 2023-12-25  5 sessions (fixture has no Christmas closure)
//!   week of 2024-01-01  4 sessions → short
//!   week of 2024-01-08  5 sessions → regular
//!
//! GREEN when the short week is described, the week before it is labelled,
//! the provider is queried once per call, and provider failures propagate.

use tsm_core::{
    GridEngine, GridError, Selection, TimestampFilter, TradingWeekday, WeekClass,
};
use tsm_testkit::{d, FixtureCalendar};

const MARKET: &str = "FIX";

fn fixture() -> FixtureCalendar {
    FixtureCalendar::new().with_weekdays(MARKET, d(2023, 12, 1), d(2024, 3, 31), [d(2024, 1, 3)])
}

#[test]
fn wednesday_holiday_makes_short_week() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let c = engine.classify(MARKET, d(2023, 12, 25), d(2024, 1, 12)).unwrap();

    assert_eq!(c.descriptors.len(), 1);
    let w = &c.descriptors[0];
    assert_eq!(w.week_start, d(2024, 1, 1));
    assert_eq!(w.week_end, d(2024, 1, 5));
    assert_eq!(w.trading_day_count, 4);
    assert_eq!(w.holidays.iter().copied().collect::<Vec<_>>(), vec![d(2024, 1, 3)]);

    assert!(c.week_before_short.contains(&d(2023, 12, 25)));
    assert_eq!(c.week_before_short.len(), 5);
    assert_eq!(c.class_of(d(2024, 1, 4)), Some(WeekClass::Short));
    assert_eq!(c.class_of(d(2024, 1, 8)), Some(WeekClass::Regular));
    assert_eq!(c.class_of(d(2024, 1, 3)), None);
}

#[test]
fn short_week_partially_in_range_counts_full_week() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    // Range starts Thursday of the short week.
    let weeks = engine.classify_weeks(MARKET, d(2024, 1, 4), d(2024, 1, 12)).unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].trading_day_count, 4);
    assert_eq!(weeks[0].trading_dates, vec![d(2024, 1, 4), d(2024, 1, 5)]);
}

#[test]
fn one_provider_query_per_call() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let f = TimestampFilter::new(d(2024, 1, 1), d(2024, 3, 31), 5);
    engine.generate_timestamps(MARKET, &f).unwrap();
    assert_eq!(cal.session_queries(), 1);
    engine.dates_only(MARKET, &f).unwrap();
    assert_eq!(cal.session_queries(), 2);
}

#[test]
fn january_only_over_first_quarter() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let f = TimestampFilter::new(d(2024, 1, 1), d(2024, 3, 31), 60)
        .with_months(Selection::months([1]).unwrap());
    let dates = engine.dates_only(MARKET, &f).unwrap();
    // 23 January weekdays minus the 01-03 closure.
    assert_eq!(dates.len(), 22);
    assert!(dates.iter().all(|x| x.format("%m").to_string() == "01"));
}

#[test]
fn filters_are_conjunctive() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let f = TimestampFilter::new(d(2023, 12, 25), d(2024, 1, 12), 60)
        .with_week_types(Selection::week_types([WeekClass::Short, WeekClass::WeekBeforeShort]))
        .with_weekdays(Selection::weekdays([TradingWeekday::Wed]));
    // Wednesdays: 12-27 (before short), 01-03 closed, 01-10 regular.
    assert_eq!(engine.dates_only(MARKET, &f).unwrap(), vec![d(2023, 12, 27)]);
}

#[test]
fn five_minute_single_day() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let grid = engine
        .generate_timestamps(MARKET, &TimestampFilter::new(d(2024, 1, 2), d(2024, 1, 2), 5))
        .unwrap();
    let s = grid.to_strings();
    // The grid stays anchored on 09:30; only the opening instant is shifted.
    assert_eq!(&s[..3], &["2024-01-02 09:32", "2024-01-02 09:35", "2024-01-02 09:40"]);
    assert_eq!(s.last().map(String::as_str), Some("2024-01-02 15:55"));
    assert!(grid.records.iter().all(|r| r.at().format("%H:%M").to_string().as_str() <= "15:59"));
}

#[test]
fn inverted_range_produces_no_output() {
    let cal = fixture();
    let engine = GridEngine::new(&cal);
    let f = TimestampFilter::new(d(2024, 3, 1), d(2024, 1, 1), 5);
    assert_eq!(
        engine.generate_timestamps(MARKET, &f).unwrap_err(),
        GridError::InvalidRange {
            start: d(2024, 3, 1),
            end: d(2024, 1, 1)
        }
    );
    assert_eq!(cal.session_queries(), 0);
}

#[test]
fn unavailable_provider_propagates() {
    let cal = FixtureCalendar::new().with_unavailable(MARKET, "backend offline");
    let engine = GridEngine::new(&cal);
    let err = engine
        .generate_timestamps(MARKET, &TimestampFilter::new(d(2024, 1, 1), d(2024, 1, 5), 5))
        .unwrap_err();
    assert_eq!(err.code(), "CALENDAR_UNAVAILABLE");
}
