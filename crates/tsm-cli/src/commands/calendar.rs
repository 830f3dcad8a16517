//! Calendar views: `tsm dates`, `tsm weeks`, `tsm markets`.

use anyhow::Result;
use tsm_calendar::CalendarProvider;
use tsm_core::iso_dates;

use super::{grid_err, parse_date, FilterArgs, Session};

/// Execute `tsm dates`: comma-joined ISO dates of the filtered grid.
pub fn dates(session: &Session, args: &FilterArgs) -> Result<()> {
    let market = session.market(args.market.as_deref());
    let filter = args.to_filter(&session.settings.defaults)?;
    let dates = session
        .engine()
        .dates_only(market, &filter)
        .map_err(grid_err)?;

    println!("market={market}");
    println!("count={}", dates.len());
    println!("dates={}", iso_dates(&dates).join(","));
    Ok(())
}

/// Execute `tsm weeks`: one line per short week plus class totals.
pub fn weeks(session: &Session, start: &str, end: &str, market: Option<&str>) -> Result<()> {
    let market = session.market(market);
    let start = parse_date("--start", start)?;
    let end = parse_date("--end", end)?;
    let c = session
        .engine()
        .classify(market, start, end)
        .map_err(grid_err)?;

    println!("market={market}");
    for w in &c.descriptors {
        let holidays: Vec<String> = w.holidays.iter().map(|d| d.to_string()).collect();
        println!(
            "short_week week_start={} week_end={} trading_day_count={} holidays={}",
            w.week_start,
            w.week_end,
            w.trading_day_count,
            holidays.join(",")
        );
    }
    println!("short_weeks={}", c.descriptors.len());
    println!("short_days={}", c.short.len());
    println!("week_before_short_days={}", c.week_before_short.len());
    println!("regular_days={}", c.regular.len());
    Ok(())
}

/// Execute `tsm markets`.
pub fn markets(session: &Session) {
    for m in session.registry.markets() {
        println!(
            "market={} aliases={} timezone={} holidays={}",
            m.id,
            m.aliases.join(","),
            m.timezone,
            m.holiday_count
        );
    }
}
