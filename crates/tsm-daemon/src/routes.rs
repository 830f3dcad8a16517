//! Axum router and all HTTP handlers for tsm-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use tracing::info;
use tsm_calendar::{CalendarError, CalendarProvider};
use tsm_core::{
    parse_months, parse_week_types, parse_weekdays, GridError, TimestampFilter, TimestampGrid,
    CSV_HEADER, DATE_FORMAT,
};

use crate::{
    api_types::{
        DatesResponse, ErrorResponse, GridQuery, HealthResponse, MarketsResponse,
        TimestampsResponse, WeeksQuery, WeeksResponse,
    },
    state::{uptime_secs, AppState},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/markets", get(markets))
        .route("/v1/timestamps", get(timestamps))
        .route("/v1/timestamps.csv", get(timestamps_csv))
        .route("/v1/dates", get(dates))
        .route("/v1/weeks", get(weeks))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Handler failure rendered as `{ "error", "code" }` with a matching status.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message,
        }
    }
}

impl From<GridError> for ApiError {
    fn from(e: GridError) -> Self {
        let status = match &e {
            GridError::InvalidRange { .. }
            | GridError::InvalidInterval(_)
            | GridError::InvalidFilter(_)
            | GridError::InvalidSessionClock(_) => StatusCode::BAD_REQUEST,
            GridError::Calendar(CalendarError::UnknownMarket(_)) => StatusCode::NOT_FOUND,
            GridError::Calendar(CalendarError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

fn required_date(name: &str, raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("missing query parameter '{name}'")))?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        ApiError::bad_request(format!("invalid {name} '{raw}'. expected YYYY-MM-DD"))
    })
}

fn resolve_market(st: &AppState, raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&st.defaults.market)
        .to_string()
}

impl GridQuery {
    fn to_filter(&self, st: &AppState) -> Result<(String, TimestampFilter), ApiError> {
        let start = required_date("start", self.start.as_deref())?;
        let end = required_date("end", self.end.as_deref())?;
        let interval = match self.interval.as_deref().map(str::trim) {
            None | Some("") => st.defaults.interval_minutes,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                ApiError::bad_request(format!("invalid interval '{raw}'. expected minutes"))
            })?,
        };
        let all = "all";
        let filter = TimestampFilter::new(start, end, interval)
            .with_months(parse_months(self.months.as_deref().unwrap_or(all))?)
            .with_weekdays(parse_weekdays(self.weekdays.as_deref().unwrap_or(all))?)
            .with_week_types(parse_week_types(self.week_types.as_deref().unwrap_or(all))?);
        Ok((resolve_market(st, self.market.as_deref()), filter))
    }
}

fn run_grid(st: &AppState, q: &GridQuery) -> Result<(String, TimestampFilter, TimestampGrid), ApiError> {
    let (market, filter) = q.to_filter(st)?;
    let grid = st.engine().generate_timestamps(&market, &filter)?;
    info!(
        market = %market,
        start = %filter.start,
        end = %filter.end,
        interval_minutes = filter.interval_minutes,
        count = grid.len(),
        "timestamps generated"
    );
    Ok((market, filter, grid))
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
            daemon_uptime_secs: uptime_secs(),
            config_hash: st.config_hash.clone(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/markets
// ---------------------------------------------------------------------------

pub(crate) async fn markets(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    Json(MarketsResponse {
        markets: st.registry.markets(),
    })
}

// ---------------------------------------------------------------------------
// GET /v1/timestamps
// ---------------------------------------------------------------------------

pub(crate) async fn timestamps(
    State(st): State<Arc<AppState>>,
    Query(q): Query<GridQuery>,
) -> Result<Json<TimestampsResponse>, ApiError> {
    let (market, filter, grid) = run_grid(&st, &q)?;
    Ok(Json(TimestampsResponse {
        market,
        start: filter.start,
        end: filter.end,
        interval_minutes: filter.interval_minutes,
        count: grid.len(),
        admissible_days: grid.admissible_days,
        file_name: filter.csv_file_name(),
        warning: grid.warning(),
        timestamps: grid.records,
    }))
}

// ---------------------------------------------------------------------------
// GET /v1/timestamps.csv
// ---------------------------------------------------------------------------

/// Same grid as `/v1/timestamps`, as a downloadable single-column CSV.
pub(crate) async fn timestamps_csv(
    State(st): State<Arc<AppState>>,
    Query(q): Query<GridQuery>,
) -> Result<Response, ApiError> {
    let (_, filter, grid) = run_grid(&st, &q)?;
    let body = render_csv(&grid).map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "CSV_WRITE_FAILED",
        message: e.to_string(),
    })?;

    let disposition = format!("attachment; filename=\"{}\"", filter.csv_file_name());
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn render_csv(grid: &TimestampGrid) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([CSV_HEADER])?;
    for r in &grid.records {
        wtr.write_record([r.to_string()])?;
    }
    wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

// ---------------------------------------------------------------------------
// GET /v1/dates
// ---------------------------------------------------------------------------

pub(crate) async fn dates(
    State(st): State<Arc<AppState>>,
    Query(q): Query<GridQuery>,
) -> Result<Json<DatesResponse>, ApiError> {
    let (market, _, grid) = run_grid(&st, &q)?;
    let dates = grid.dates();
    Ok(Json(DatesResponse {
        market,
        count: dates.len(),
        dates,
    }))
}

// ---------------------------------------------------------------------------
// GET /v1/weeks
// ---------------------------------------------------------------------------

pub(crate) async fn weeks(
    State(st): State<Arc<AppState>>,
    Query(q): Query<WeeksQuery>,
) -> Result<Json<WeeksResponse>, ApiError> {
    let start = required_date("start", q.start.as_deref())?;
    let end = required_date("end", q.end.as_deref())?;
    let market = resolve_market(&st, q.market.as_deref());
    let c = st.engine().classify(&market, start, end)?;
    info!(market = %market, %start, %end, short_weeks = c.descriptors.len(), "weeks classified");

    Ok(Json(WeeksResponse {
        short_days: c.short.len(),
        week_before_short_days: c.week_before_short.len(),
        regular_days: c.regular.len(),
        weeks: c.descriptors,
        market,
    }))
}
