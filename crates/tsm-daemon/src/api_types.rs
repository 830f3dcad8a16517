//! Request and response types for all tsm-daemon HTTP endpoints.
//!
//! Query types are `Deserialize`; response types are `Serialize` so Axum
//! can JSON-encode them. No business logic lives here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tsm_calendar::MarketInfo;
use tsm_core::{GridWarning, TimestampRecord, WeekDescriptor};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub daemon_uptime_secs: u64,
    pub config_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable code, e.g. "INVALID_RANGE" | "UNKNOWN_MARKET" | "BAD_REQUEST"
    pub code: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Query string of `/v1/timestamps`, `/v1/timestamps.csv` and `/v1/dates`.
///
/// Lists are comma-separated and use the same vocabulary as the CLI
/// (`months=1,feb`, `weekdays=mon,4`, `week_types=short,before-short`).
/// Everything is a string so malformed input yields a JSON 400 instead of
/// the extractor's plain-text rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Option<String>,
    pub months: Option<String>,
    pub weekdays: Option<String>,
    pub week_types: Option<String>,
    pub market: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeksQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub market: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MarketsResponse {
    pub markets: Vec<MarketInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimestampsResponse {
    pub market: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval_minutes: i64,
    pub count: usize,
    pub admissible_days: usize,
    /// Suggested download name for the CSV variant.
    pub file_name: String,
    /// Present when the grid is empty; an empty grid is still a 200.
    pub warning: Option<GridWarning>,
    pub timestamps: Vec<TimestampRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatesResponse {
    pub market: String,
    pub count: usize,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeksResponse {
    pub market: String,
    pub weeks: Vec<WeekDescriptor>,
    pub short_days: usize,
    pub week_before_short_days: usize,
    pub regular_days: usize,
}
