//! Whole-pipeline properties over the built-in NYSE calendar.
//!
//! GREEN when, for several ranges and intervals:
//! - every timestamp's date is inside the range and is a real session;
//! - every short-week descriptor has 1..=4 sessions;
//! - Short / WeekBeforeShort / Regular partition the sessions in range;
//! - repeated calls return identical grids;
//! - output is strictly increasing, day by day;
//! - each day opens on the shifted open, never the bare open.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use tsm_calendar::{CalendarProvider, CalendarRegistry, XNYS};
use tsm_core::{GridEngine, TimestampFilter, WeekClassification};
use tsm_testkit::d;

const RANGES: &[((i32, u32, u32), (i32, u32, u32))] = &[
    ((2022, 1, 1), (2022, 12, 31)),
    ((2023, 11, 15), (2024, 1, 20)),
    ((2024, 3, 27), (2024, 4, 2)),
    ((2025, 1, 1), (2025, 1, 31)),
    ((2026, 6, 30), (2026, 7, 10)),
    ((2027, 12, 20), (2027, 12, 31)),
];

const INTERVALS: &[i64] = &[1, 5, 13, 60, 400];

fn ranges() -> impl Iterator<Item = (NaiveDate, NaiveDate)> {
    RANGES
        .iter()
        .map(|&((y1, m1, d1), (y2, m2, d2))| (d(y1, m1, d1), d(y2, m2, d2)))
}

fn sessions(reg: &CalendarRegistry, start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    reg.sessions(XNYS, start, end).unwrap().into_iter().collect()
}

#[test]
fn timestamps_stay_in_range_on_sessions() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    for (start, end) in ranges() {
        let valid = sessions(&reg, start, end);
        for &interval in INTERVALS {
            let grid = engine
                .generate_timestamps(XNYS, &TimestampFilter::new(start, end, interval))
                .unwrap();
            for r in &grid.records {
                assert!(r.date() >= start && r.date() <= end, "{r} outside {start}..{end}");
                assert!(valid.contains(&r.date()), "{r} is not a session");
            }
            assert_eq!(grid.dates().len(), valid.len());
        }
    }
}

#[test]
fn descriptors_are_strictly_short() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    for (start, end) in ranges() {
        for w in engine.classify_weeks(XNYS, start, end).unwrap() {
            assert!(
                w.trading_day_count > 0 && w.trading_day_count < 5,
                "week {} has {}",
                w.week_start,
                w.trading_day_count
            );
            assert!(!w.holidays.is_empty(), "short week {} lists no holiday", w.week_start);
        }
    }
}

#[test]
fn classes_partition_sessions() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    for (start, end) in ranges() {
        let c: WeekClassification = engine.classify(XNYS, start, end).unwrap();
        assert!(c.short.is_disjoint(&c.week_before_short));
        assert!(c.short.is_disjoint(&c.regular));
        assert!(c.week_before_short.is_disjoint(&c.regular));

        let union: BTreeSet<NaiveDate> = c
            .short
            .iter()
            .chain(&c.week_before_short)
            .chain(&c.regular)
            .copied()
            .collect();
        assert_eq!(union, sessions(&reg, start, end), "{start}..{end}");
    }
}

#[test]
fn generation_is_idempotent() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    for (start, end) in ranges() {
        let f = TimestampFilter::new(start, end, 15);
        let a = engine.generate_timestamps(XNYS, &f).unwrap();
        let b = engine.generate_timestamps(XNYS, &f).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn output_is_strictly_increasing_and_opens_shifted() {
    let reg = CalendarRegistry::with_builtin();
    let engine = GridEngine::new(&reg);
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    let shifted = NaiveTime::from_hms_opt(9, 32, 0).unwrap();

    for (start, end) in ranges() {
        for &interval in INTERVALS {
            let grid = engine
                .generate_timestamps(XNYS, &TimestampFilter::new(start, end, interval))
                .unwrap();
            assert!(grid.records.windows(2).all(|w| w[0] < w[1]));

            let mut seen: BTreeSet<NaiveDate> = BTreeSet::new();
            for r in &grid.records {
                assert_ne!(r.at().time(), open, "bare open at {r}");
                if seen.insert(r.date()) {
                    assert_eq!(r.at().time(), shifted, "first record of {} is {r}", r.date());
                }
            }
        }
    }
}
