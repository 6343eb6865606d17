//! `sessions` CLI — expand recurring sessions, check booking conflicts, apply
//! exceptions and group overlaps from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a recurring booking (stdin → stdout)
//! echo '{"owner_id":"b1","start":"2023-01-16T10:00:00","end_time":"11:00:00",
//!        "timezone":"America/New_York","rule":"FREQ=WEEKLY;BYDAY=MO,WE,FR",
//!        "lower_bound":"2023-01-10","upper_bound":"2023-03-10"}' | sessions expand
//!
//! # Check candidates against existing bookings, exit 1 on conflict
//! sessions check -i booking.json --fail-on-conflict
//!
//! # Apply skip/cancel/reschedule exceptions for a date window
//! sessions resolve -i calendar.json
//!
//! # Render a long-lived series with its exceptions
//! sessions series -i series.json
//!
//! # Group overlapping sessions per local day
//! sessions group -i occurrences.json --by-day --timezone Europe/Berlin
//!
//! # Pre-validate rule text
//! sessions validate 'FREQ=MONTHLY;BYDAY=TU;BYSETPOS=3'
//! ```

mod input;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use session_engine::Occurrence;
use std::io::{self, Read};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::input::{parse_tz, CheckInput, ExpandInput, ResolveInput, SeriesInput};
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "sessions",
    version,
    about = "Recurring session expansion and booking conflict checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML settings file (SESSIONS_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a session window and optional rule into occurrences
    Expand {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Use the container (hub) lookahead instead of the booking one
        #[arg(long)]
        container: bool,
    },
    /// Check candidate occurrences against existing bookings
    Check {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Exit with status 1 when any conflict is found
        #[arg(long)]
        fail_on_conflict: bool,
    },
    /// Apply exceptions to occurrences within a date window
    Resolve {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Render a recurring series over a date window
    Series {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Cluster overlapping occurrences for display
    Group {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Group each local calendar day separately (requires --timezone)
        #[arg(long, requires = "timezone")]
        by_day: bool,
        /// IANA timezone used for day buckets (only with --by-day)
        #[arg(long, requires = "by_day")]
        timezone: Option<String>,
    },
    /// Validate recurrence rule text and print its decoded form
    Validate {
        /// Rule text, e.g. "FREQ=WEEKLY;BYDAY=MO,WE,FR"
        rule: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(&settings.logging.level);

    match cli.command {
        Commands::Expand {
            input,
            output,
            container,
        } => {
            let request: ExpandInput = read_json(input.as_deref())?;
            let params = request.to_params()?;
            let config = if container {
                settings.container
            } else {
                settings.booking
            };
            let occurrences = session_engine::expand_recurrence(&request.owner_id, &params, &config);
            write_json(output.as_deref(), &occurrences)?;
        }
        Commands::Check {
            input,
            output,
            fail_on_conflict,
        } => {
            let request: CheckInput = read_json(input.as_deref())?;
            let report = session_engine::check_conflicts(&request.candidates, &request.existing);
            write_json(output.as_deref(), &report)?;
            if fail_on_conflict && !report.success {
                process::exit(1);
            }
        }
        Commands::Resolve { input, output } => {
            let request: ResolveInput = read_json(input.as_deref())?;
            let tz = parse_tz(&request.timezone)?;
            let resolved = session_engine::resolve_exceptions(
                request.occurrences,
                &request.exceptions,
                &request.window,
                tz,
            );
            write_json(output.as_deref(), &resolved)?;
        }
        Commands::Series { input, output } => {
            let request: SeriesInput = read_json(input.as_deref())?;
            let tz = parse_tz(&request.timezone)?;
            let occurrences = request
                .series
                .occurrences(&request.window, &request.exceptions, tz, &settings.container)
                .context("Failed to render series")?;
            write_json(output.as_deref(), &occurrences)?;
        }
        Commands::Group {
            input,
            output,
            by_day,
            timezone,
        } => {
            let occurrences: Vec<Occurrence> = read_json(input.as_deref())?;
            match timezone.filter(|_| by_day) {
                Some(tz) => {
                    let days = session_engine::group_overlaps_by_day(&occurrences, parse_tz(&tz)?);
                    write_json(output.as_deref(), &days)?;
                }
                None => {
                    let groups = session_engine::group_overlaps(&occurrences);
                    write_json(output.as_deref(), &groups)?;
                }
            }
        }
        Commands::Validate { rule } => {
            let decoded = session_engine::validate_rule(&rule).context("Invalid recurrence rule")?;
            let view = serde_json::json!({
                "rule": decoded.to_string(),
                "anchor_date": decoded.anchor_date,
                "frequency": decoded.frequency,
                "interval": decoded.interval,
                "by_weekday": decoded.by_weekday,
                "count": decoded.count,
                "until": decoded.until,
            });
            write_json(None, &view)?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse input JSON")
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    write_output(path, &pretty)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
