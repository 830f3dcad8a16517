//! Intraday timestamp grid.
//!
//! For every admissible date the grid walks `open, open + k*interval, ...`
//! up to and including `cutoff`. The single instant equal to `open` is
//! recorded as `open + open_offset` (first-tick delay after the opening
//! auction). Later instants stay on the unshifted grid, so the first two
//! records of a day can be closer than `interval` apart.
//!
//! Unshifted instants that do not fall strictly after the shifted open
//! (possible when `interval <= open_offset`) are dropped so each day stays
//! strictly increasing.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::{GridError, TimestampRecord};

pub const DEFAULT_OPEN: (u32, u32) = (9, 30);
pub const DEFAULT_CUTOFF: (u32, u32) = (15, 59);
pub const DEFAULT_OPEN_OFFSET_MINUTES: i64 = 2;

// ---------------------------------------------------------------------------
// SessionClock
// ---------------------------------------------------------------------------

/// Nominal session open, last admissible instant, and the open shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionClock {
    open: NaiveTime,
    cutoff: NaiveTime,
    open_offset_minutes: i64,
}

impl Default for SessionClock {
    /// 09:30 open, 15:59 cutoff, 2-minute open shift.
    fn default() -> Self {
        Self {
            open: hm(DEFAULT_OPEN),
            cutoff: hm(DEFAULT_CUTOFF),
            open_offset_minutes: DEFAULT_OPEN_OFFSET_MINUTES,
        }
    }
}

fn hm((h, m): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

impl SessionClock {
    /// Requires `open < cutoff`, `offset >= 0` and `open + offset <= cutoff`.
    pub fn new(
        open: NaiveTime,
        cutoff: NaiveTime,
        open_offset_minutes: i64,
    ) -> Result<Self, GridError> {
        if open >= cutoff {
            return Err(GridError::InvalidSessionClock(format!(
                "open {open} must be before cutoff {cutoff}"
            )));
        }
        if open_offset_minutes < 0 {
            return Err(GridError::InvalidSessionClock(format!(
                "open offset {open_offset_minutes} must be >= 0"
            )));
        }
        if open_offset_minutes > (cutoff - open).num_minutes() {
            return Err(GridError::InvalidSessionClock(format!(
                "open offset {open_offset_minutes}m pushes the open past cutoff {cutoff}"
            )));
        }
        Ok(Self {
            open,
            cutoff,
            open_offset_minutes,
        })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    pub fn open_offset_minutes(&self) -> i64 {
        self.open_offset_minutes
    }

    /// Open clock time after the shift (09:32 by default).
    pub fn shifted_open(&self) -> NaiveTime {
        self.open + Duration::minutes(self.open_offset_minutes)
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Rejects a non-positive interval before any stepping happens.
pub fn check_interval(interval_minutes: i64) -> Result<(), GridError> {
    if interval_minutes <= 0 {
        return Err(GridError::InvalidInterval(interval_minutes));
    }
    Ok(())
}

/// Records for every date in `dates`, in the order the dates are given.
pub fn generate(
    dates: &[NaiveDate],
    interval_minutes: i64,
    clock: &SessionClock,
) -> Result<Vec<TimestampRecord>, GridError> {
    check_interval(interval_minutes)?;
    let mut out = Vec::new();
    for date in dates {
        out.extend(day_series(*date, interval_minutes, clock));
    }
    Ok(out)
}

/// One day's records. `interval_minutes` must already be validated.
pub fn day_series(
    date: NaiveDate,
    interval_minutes: i64,
    clock: &SessionClock,
) -> Vec<TimestampRecord> {
    let open = date.and_time(clock.open);
    let shifted = open + Duration::minutes(clock.open_offset_minutes);
    let span = (clock.cutoff - clock.open).num_minutes();

    let mut out = Vec::new();
    let mut elapsed = 0i64;
    while elapsed <= span {
        let at = open + Duration::minutes(elapsed);
        if at == open {
            out.push(TimestampRecord::new(shifted));
        } else if at > shifted {
            out.push(TimestampRecord::new(at));
        }
        elapsed = match elapsed.checked_add(interval_minutes) {
            Some(next) => next,
            None => break,
        };
    }
    out
}
