use chrono::NaiveDate;
use tracing::{debug, warn};
use tsm_calendar::CalendarProvider;

use crate::filter::admissible_dates;
use crate::grid::{check_interval, generate, SessionClock};
use crate::weeks::{classify, extended_range, WeekClassification};
use crate::{GridError, TimestampFilter, TimestampGrid, WeekDescriptor};

/// Composes classifier → filter → grid for one calendar provider.
///
/// Holds no state between calls beyond the provider handle and the session
/// clock; identical inputs always produce identical outputs.
#[derive(Clone, Copy)]
pub struct GridEngine<'a> {
    provider: &'a dyn CalendarProvider,
    clock: SessionClock,
}

impl<'a> GridEngine<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        Self {
            provider,
            clock: SessionClock::default(),
        }
    }

    pub fn with_clock(mut self, clock: SessionClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Short-week descriptors overlapping `[start, end]`.
    pub fn classify_weeks(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeekDescriptor>, GridError> {
        Ok(self.classify(market, start, end)?.descriptors)
    }

    /// Full classification (descriptors plus the three date sets).
    pub fn classify(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeekClassification, GridError> {
        classify(self.provider, market, start, end)
    }

    /// Sessions surviving every filter, in schedule order.
    pub fn admissible_dates(
        &self,
        market: &str,
        filter: &TimestampFilter,
    ) -> Result<Vec<NaiveDate>, GridError> {
        extended_range(filter.start, filter.end)?;
        check_interval(filter.interval_minutes)?;
        filter.months.check_months()?;

        let classification = self.classify(market, filter.start, filter.end)?;
        Ok(admissible_dates(&classification, filter))
    }

    /// Open marker plus interval series for every admissible date.
    pub fn generate_timestamps(
        &self,
        market: &str,
        filter: &TimestampFilter,
    ) -> Result<TimestampGrid, GridError> {
        let dates = self.admissible_dates(market, filter)?;
        let records = generate(&dates, filter.interval_minutes, &self.clock)?;
        let grid = TimestampGrid {
            records,
            admissible_days: dates.len(),
        };

        if let Some(w) = grid.warning() {
            warn!(market, start = %filter.start, end = %filter.end, "{w}");
        } else {
            debug!(
                market,
                days = grid.admissible_days,
                records = grid.len(),
                interval_minutes = filter.interval_minutes,
                "generated timestamps"
            );
        }
        Ok(grid)
    }

    /// Unique dates of [`GridEngine::generate_timestamps`], ascending.
    pub fn dates_only(
        &self,
        market: &str,
        filter: &TimestampFilter,
    ) -> Result<Vec<NaiveDate>, GridError> {
        Ok(self.generate_timestamps(market, filter)?.dates())
    }
}
