use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tripledger_client::ledger::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    let shaped = value.len() == 10
        && value
            .bytes()
            .enumerate()
            .all(|(index, byte)| match index {
                4 | 7 => byte == b'-',
                _ => byte.is_ascii_digit(),
            });
    if !shaped {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

/// Accepts `12.50` as well as the `12,50` form used on the receipts.
pub fn parse_amount(value: &str) -> Result<f64, String> {
    let normalized = value.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err("amount must be a number such as 42.50".to_string()),
    }
}

pub fn parse_position(value: &str) -> Result<GeoPoint, String> {
    value.parse::<GeoPoint>()
}

pub const TRIP_AFTER_HELP: &str = "\
How trip capture works:
  1. `tripledger trip start --at <lat,lng>` records where the fare began.
  2. `tripledger trip end --at <lat,lng>` records where it ended and measures
     the straight-line distance. Add `--round-trip` to double it.
  3. `tripledger revenue add ...` without `--km` uses the measured distance
     and clears the trip.

  Without `--at` no position provider is available and the step fails;
  run `tripledger trip reset` to start over at any time.
";

#[derive(Debug, Parser)]
#[command(
    name = "tripledger",
    version,
    about = "trip revenue and expense ledger for drivers",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record trip fares
    #[command(arg_required_else_help = true)]
    Revenue {
        #[command(subcommand)]
        command: RevenueCommand,
    },
    /// Record operating costs
    #[command(arg_required_else_help = true)]
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },
    /// Browse and remove records
    #[command(arg_required_else_help = true)]
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
    /// Show totals and the expense breakdown for one month
    Summary {
        /// Month number, 1-12 (defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Four-digit year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure a trip distance from start and end positions
    #[command(arg_required_else_help = true, after_help = TRIP_AFTER_HELP)]
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },
    /// List the months and years available for filtering
    Periods {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge records exported from the browser ledger
    Import {
        /// Path to the exported JSON array
        #[arg(long, value_name = "PATH")]
        legacy: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RevenueCommand {
    /// Add a fare
    Add {
        /// Passenger or account name
        #[arg(long = "client")]
        client_name: String,
        /// Where the trip ended
        #[arg(long)]
        destination: String,
        /// Fare amount
        #[arg(long, value_parser = parse_amount)]
        amount: f64,
        /// Trip date, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        /// Distance driven; overrides a measured trip
        #[arg(long, value_parser = parse_amount)]
        km: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Add an expense
    Add {
        /// Fuel, Toll, Maintenance, Meal, Other, or any custom label
        #[arg(long)]
        category: String,
        /// Expense amount
        #[arg(long, value_parser = parse_amount)]
        amount: f64,
        /// Free-text note
        #[arg(long)]
        description: Option<String>,
        /// Expense date, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List records of one month, newest first
    List {
        /// Month number, 1-12 (defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Four-digit year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one record by id
    Delete {
        /// Record id as shown by `tripledger records list`
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Capture the starting position
    Start {
        /// Position as `lat,lng`
        #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
        at: Option<GeoPoint>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Capture the end position and measure the distance
    End {
        /// Position as `lat,lng`
        #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
        at: Option<GeoPoint>,
        /// Count the distance twice
        #[arg(long)]
        round_trip: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current capture state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discard the current capture
    Reset,
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
