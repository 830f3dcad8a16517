//! Command handler modules for tsm-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod calendar;
pub mod timestamps;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use tracing::warn;
use tsm_calendar::CalendarRegistry;
use tsm_config::{Defaults, Settings, UnusedKeyPolicy};
use tsm_core::{
    parse_months, parse_week_types, parse_weekdays, GridEngine, GridError, SessionClock,
    TimestampFilter,
};

// ---------------------------------------------------------------------------
// Session (config + calendars)
// ---------------------------------------------------------------------------

/// Everything a command needs after config has been resolved.
pub struct Session {
    pub settings: Settings,
    pub registry: CalendarRegistry,
    pub clock: SessionClock,
    /// `None` when running on built-in defaults only.
    pub config_hash: Option<String>,
}

impl Session {
    pub fn engine(&self) -> GridEngine<'_> {
        GridEngine::new(&self.registry).with_clock(self.clock)
    }

    pub fn market<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.settings.defaults.market)
    }
}

/// Load layered config from `--config`, else `TSM_CONFIG`, else defaults.
pub fn load_session(config_paths: &[String]) -> Result<Session> {
    let paths = if config_paths.is_empty() {
        tsm_config::paths_from_env()
    } else {
        config_paths.to_vec()
    };

    let (settings, config_hash) = if paths.is_empty() {
        (Settings::default(), None)
    } else {
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        let loaded = tsm_config::load_layered_yaml(&path_refs)?;
        let report = tsm_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        for ptr in &report.unused_leaf_pointers {
            warn!(pointer = %ptr, "unused config key");
        }
        (loaded.settings()?, Some(loaded.config_hash))
    };

    let registry = settings.build_registry()?;
    let clock = settings.session_clock()?;
    Ok(Session {
        settings,
        registry,
        clock,
        config_hash,
    })
}

// ---------------------------------------------------------------------------
// Shared filter flags
// ---------------------------------------------------------------------------

#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// First date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start: String,

    /// Last date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub end: String,

    /// Minutes between grid instants (defaults to config `defaults.interval_minutes`)
    #[arg(long)]
    pub interval: Option<i64>,

    /// Months to keep: `all` or a list such as `1,2,mar`
    #[arg(long, default_value = "all")]
    pub months: String,

    /// Weekdays to keep: `all` or a list such as `mon,tue` / `0,1`
    #[arg(long, default_value = "all")]
    pub weekdays: String,

    /// Week classes to keep: `all` or a list of `short,before-short,regular`
    #[arg(long = "week-types", default_value = "all")]
    pub week_types: String,

    /// Market id or alias (defaults to config `defaults.market`)
    #[arg(long)]
    pub market: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self, defaults: &Defaults) -> Result<TimestampFilter> {
        let start = parse_date("--start", &self.start)?;
        let end = parse_date("--end", &self.end)?;
        let interval = self.interval.unwrap_or(defaults.interval_minutes);

        Ok(TimestampFilter::new(start, end, interval)
            .with_months(parse_months(&self.months).map_err(grid_err)?)
            .with_weekdays(parse_weekdays(&self.weekdays).map_err(grid_err)?)
            .with_week_types(parse_week_types(&self.week_types).map_err(grid_err)?))
    }
}

pub fn parse_date(flag: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), tsm_core::DATE_FORMAT)
        .with_context(|| format!("invalid {flag} '{raw}'. expected YYYY-MM-DD"))
}

/// Prefix the stable code so scripts can match on it.
pub fn grid_err(e: GridError) -> anyhow::Error {
    anyhow!("{}: {}", e.code(), e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(start: &str, end: &str) -> FilterArgs {
        FilterArgs {
            start: start.to_string(),
            end: end.to_string(),
            interval: None,
            months: "all".to_string(),
            weekdays: "all".to_string(),
            week_types: "all".to_string(),
            market: None,
        }
    }

    #[test]
    fn interval_falls_back_to_config_default() {
        let f = args("2024-01-01", "2024-01-31")
            .to_filter(&Defaults::default())
            .unwrap();
        assert_eq!(f.interval_minutes, 5);
        assert!(f.months.is_all());
    }

    #[test]
    fn bad_date_names_the_flag() {
        let err = args("2024-13-01", "2024-01-31")
            .to_filter(&Defaults::default())
            .unwrap_err();
        assert!(err.to_string().contains("--start"));
    }

    #[test]
    fn bad_weekday_carries_code() {
        let mut a = args("2024-01-01", "2024-01-31");
        a.weekdays = "sat".to_string();
        let err = a.to_filter(&Defaults::default()).unwrap_err();
        assert!(err.to_string().starts_with("INVALID_FILTER"));
    }
}
