//! tsm-core
//!
//! Trading-session timestamp grid.
//!
//! Pipeline, leaf-first:
//! - `weeks`: short-week classifier (Short / WeekBeforeShort / Regular).
//! - `filter`: week-type, month and weekday predicates over the sessions.
//! - `grid`: open marker + fixed-interval intraday series per date.
//! - `engine`: [`GridEngine`] composing the three against a calendar provider.
//!
//! Pure deterministic logic. No IO, no wall-clock, no caches. The only
//! external call is the read-only calendar provider query.

mod engine;
mod error;
pub mod filter;
pub mod grid;
pub mod selection;
mod types;
pub mod weeks;

pub use engine::GridEngine;
pub use error::GridError;
pub use grid::SessionClock;
pub use selection::{
    month_name, parse_months, parse_week_types, parse_weekdays, Selection, TradingWeekday,
    WeekClass,
};
pub use types::*;
pub use weeks::WeekClassification;
