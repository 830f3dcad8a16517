//! tsm-calendar
//!
//! Trading calendar provider seam for the timestamp grid.
//!
//! - `provider`: the [`CalendarProvider`] trait the core consumes.
//! - `calendar`: weekday/holiday calendars and the US equities closure table.
//! - `registry`: market-id lookup implementing the provider.
//!
//! Pure deterministic logic. No IO, no wall-clock.

pub mod calendar;
pub mod provider;
pub mod registry;

pub use calendar::{us_equity_holidays, MarketCalendar};
pub use provider::{CalendarError, CalendarProvider, MarketInfo};
pub use registry::{CalendarRegistry, WEEKDAYS, XNAS, XNYS};
