use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::FilterArgs;

#[derive(Parser)]
#[command(name = "tsm")]
#[command(about = "Trading-session timestamp grid CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (comma-separated or repeated).
    /// Falls back to TSM_CONFIG when omitted.
    #[arg(long = "config", global = true, value_delimiter = ',')]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the intraday timestamp grid and export it as CSV
    Timestamps {
        #[command(flatten)]
        filter: FilterArgs,

        /// Directory the CSV file is written to
        #[arg(long, default_value = ".", conflicts_with = "stdout")]
        out: PathBuf,

        /// Write CSV to stdout instead of a file (summary goes to stderr)
        #[arg(long, default_value_t = false)]
        stdout: bool,

        /// Print the first N timestamps after the summary (0 disables)
        #[arg(long, default_value_t = 20)]
        preview: usize,
    },

    /// Print the admissible trading dates for the given filters
    Dates {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List short weeks and per-class session counts
    Weeks {
        /// First date (YYYY-MM-DD), inclusive
        #[arg(long)]
        start: String,

        /// Last date (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: String,

        /// Market id or alias (defaults to config `defaults.market`)
        #[arg(long)]
        market: Option<String>,
    },

    /// List known markets
    Markets,

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Timestamps {
            filter,
            out,
            stdout,
            preview,
        } => {
            let session = commands::load_session(&cli.config_paths)?;
            let target = if stdout {
                commands::timestamps::Target::Stdout
            } else {
                commands::timestamps::Target::Dir(out)
            };
            commands::timestamps::run(&session, &filter, target, preview)?;
        }

        Commands::Dates { filter } => {
            let session = commands::load_session(&cli.config_paths)?;
            commands::calendar::dates(&session, &filter)?;
        }

        Commands::Weeks { start, end, market } => {
            let session = commands::load_session(&cli.config_paths)?;
            commands::calendar::weeks(&session, &start, &end, market.as_deref())?;
        }

        Commands::Markets => {
            let session = commands::load_session(&cli.config_paths)?;
            commands::calendar::markets(&session);
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = tsm_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr so CSV on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
