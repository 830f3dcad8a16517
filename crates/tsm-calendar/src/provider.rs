//! Provider boundary for trading calendars.
//!
//! This module defines **only** the provider trait, its error type and the
//! market listing type. Concrete calendars live in `calendar.rs`; the
//! market-id lookup table lives in `registry.rs`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that a [`CalendarProvider`] implementation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The market identifier is not known to this provider.
    UnknownMarket(String),
    /// The provider could not answer (backing store missing, remote down, ...).
    Unavailable(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::UnknownMarket(id) => write!(f, "unknown market: {id}"),
            CalendarError::Unavailable(msg) => write!(f, "calendar unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CalendarError {}

// ---------------------------------------------------------------------------
// Market listing
// ---------------------------------------------------------------------------

/// Descriptive metadata for a market known to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Canonical (upper-case) market identifier, e.g. `"XNYS"`.
    pub id: String,
    /// Alternative identifiers resolving to the same calendar.
    pub aliases: Vec<String>,
    /// IANA timezone name the sessions are expressed in.
    pub timezone: String,
    /// Number of holidays the calendar knows about.
    pub holiday_count: usize,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Trading calendar contract consumed by the timestamp grid.
///
/// Implementations must be object-safe so callers can hold a
/// `Box<dyn CalendarProvider>` or `Arc<dyn CalendarProvider>`, and
/// `Send + Sync` so the daemon can share one across request handlers.
///
/// The core never retries a provider call; answers are expected to be
/// deterministic for a given `(market, start, end)`.
pub trait CalendarProvider: Send + Sync {
    /// Human-readable name identifying this provider (e.g. `"builtin"`).
    fn name(&self) -> &'static str;

    /// All trading days in the inclusive range `[start, end]`, ascending.
    ///
    /// Returns an empty `Vec` when `start > end`.
    fn sessions(
        &self,
        market: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CalendarError>;

    /// Every holiday known for `market`. Callers filter by date themselves.
    fn holidays(&self, market: &str) -> Result<BTreeSet<NaiveDate>, CalendarError>;

    /// Markets this provider can answer for. The default lists none.
    fn markets(&self) -> Vec<MarketInfo> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
