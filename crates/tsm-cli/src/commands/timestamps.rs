//! `tsm timestamps`: grid generation + CSV export.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tsm_core::{month_name, TimestampFilter, TimestampGrid, CSV_HEADER};

use super::{grid_err, FilterArgs, Session};

pub enum Target {
    Stdout,
    /// Directory; the file name comes from [`TimestampFilter::csv_file_name`].
    Dir(PathBuf),
}

/// Execute `tsm timestamps`.
pub fn run(session: &Session, args: &FilterArgs, target: Target, preview: usize) -> Result<()> {
    let market = session.market(args.market.as_deref());
    let filter = args.to_filter(&session.settings.defaults)?;
    let grid = session
        .engine()
        .generate_timestamps(market, &filter)
        .map_err(grid_err)?;

    let mut lines = summary_lines(session, market, &filter, &grid);
    lines.extend(preview_lines(&grid, preview));

    match target {
        Target::Stdout => {
            let stdout = io::stdout();
            write_csv(stdout.lock(), &grid)?;
            for line in &lines {
                eprintln!("{line}");
            }
        }
        Target::Dir(dir) => {
            for line in &lines {
                println!("{line}");
            }
            // Nothing to download for an empty grid.
            if grid.is_empty() {
                return Ok(());
            }
            fs::create_dir_all(&dir)
                .with_context(|| format!("create output dir failed: {}", dir.display()))?;
            let path = dir.join(filter.csv_file_name());
            let file = fs::File::create(&path)
                .with_context(|| format!("create csv failed: {}", path.display()))?;
            write_csv(io::BufWriter::new(file), &grid)?;
            println!("csv_path={}", path.display());
        }
    }
    Ok(())
}

/// `preview_rows=N` followed by the first `N` timestamps.
fn preview_lines(grid: &TimestampGrid, preview: usize) -> Vec<String> {
    let shown = preview.min(grid.len());
    if shown == 0 {
        return Vec::new();
    }
    std::iter::once(format!("preview_rows={shown}"))
        .chain(grid.records.iter().take(shown).map(|r| r.to_string()))
        .collect()
}

/// Single-column CSV: header then one timestamp per row.
pub fn write_csv<W: Write>(w: W, grid: &TimestampGrid) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record([CSV_HEADER])
        .context("write csv header failed")?;
    for r in &grid.records {
        wtr.write_record([r.to_string()])
            .context("write csv row failed")?;
    }
    wtr.flush().context("flush csv failed")?;
    Ok(())
}

fn summary_lines(
    session: &Session,
    market: &str,
    filter: &TimestampFilter,
    grid: &TimestampGrid,
) -> Vec<String> {
    let clock = session.clock;
    let mut lines = vec![
        format!("market={market}"),
        format!("timestamps={}", grid.len()),
        format!("trading_days={}", grid.admissible_days),
        format!("date_range={} to {}", filter.start, filter.end),
        format!(
            "time_range={} to {} ({}-minute intervals)",
            clock.shifted_open().format("%H:%M"),
            clock.cutoff().format("%H:%M"),
            filter.interval_minutes
        ),
    ];

    if let Some(months) = filter.months.explicit() {
        let names: Vec<&str> = months.iter().filter_map(|m| month_name(*m)).collect();
        lines.push(format!("months={}", names.join(",")));
    }
    if let Some(days) = filter.weekdays.explicit() {
        let names: Vec<&str> = days.iter().map(|d| d.name()).collect();
        lines.push(format!("days={}", names.join(",")));
    }
    if let Some(classes) = filter.week_types.explicit() {
        let names: Vec<&str> = classes.iter().map(|c| c.as_str()).collect();
        lines.push(format!("week_types={}", names.join(",")));
    }
    if let Some(hash) = &session.config_hash {
        lines.push(format!("config_hash={hash}"));
    }
    if let Some(w) = grid.warning() {
        lines.push(format!("warning={w}"));
    }
    lines
}
