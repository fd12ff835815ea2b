mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tripledger_client::ClientError;

const LOG_ENV_VAR: &str = "TRIPLEDGER_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

const ROOT_HELP: &str = "Tripledger - trip revenue and expense ledger for drivers

Usage:
  tripledger <command>

Start here:
  tripledger revenue add --help
  tripledger summary
";

const TOP_LEVEL_HELP: &str = "Tripledger - trip revenue and expense ledger for drivers

USAGE: tripledger <command>

Log your work:
  tripledger revenue add --client <name> --destination <place> --amount <value>
  tripledger expense add --category <label> --amount <value> [--description <text>]

Measure a trip:
  1. tripledger trip start --at <lat,lng>          Capture where the fare began
  2. tripledger trip end --at <lat,lng>            Capture the end and measure the distance
  3. tripledger revenue add ...                    Attaches the measured distance
  tripledger trip status                           Show the capture in progress
  tripledger trip reset                            Discard it

Review a month:
  tripledger summary [--month <1-12>] [--year <yyyy>]        Totals and expenses by category
  tripledger records list [--month <1-12>] [--year <yyyy>]   Records, newest first
  tripledger records delete <id>                             Remove one record
  tripledger periods                                         Months and years with records

Bring older data:
  tripledger import --legacy <path>                Merge an export from the browser ledger

Most commands accept --json. The ledger lives in ~/.tripledger unless
TRIPLEDGER_HOME is set; TRIPLEDGER_LOG=debug shows diagnostics on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

/// Diagnostics go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            debug!(command = %success.command, "command succeeded");
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&text).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let command_hint = command_path_from_args(raw_args);
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's usage and "For more information" trailer; the recovery
/// steps replace them.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let words = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<_>>();

    let hint = match words.as_slice() {
        ["revenue", "add", ..] => "revenue add",
        ["expense", "add", ..] => "expense add",
        ["records", "list", ..] => "records list",
        ["records", "delete", ..] => "records delete",
        ["trip", "start", ..] => "trip start",
        ["trip", "end", ..] => "trip end",
        ["trip", "status", ..] => "trip status",
        ["trip", "reset", ..] => "trip reset",
        [
            group @ ("revenue" | "expense" | "records" | "trip" | "summary" | "periods" | "import"),
            ..,
        ] => *group,
        _ => return None,
    };
    Some(hint.to_string())
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
