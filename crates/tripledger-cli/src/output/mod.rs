mod error_text;
mod format;
mod import_text;
mod json;
mod mode;
mod records_text;
mod summary_text;
mod trip_text;

use std::io;

use tripledger_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "revenue add" | "expense add" => records_text::render_record_submit(&success.data),
        "records list" => records_text::render_records_list(&success.data),
        "records delete" => records_text::render_record_delete(&success.data),
        "summary" => summary_text::render_summary(&success.data),
        "periods" => summary_text::render_periods(&success.data),
        "trip start" | "trip end" | "trip status" | "trip reset" => {
            trip_text::render_capture(&success.command, &success.data)
        }
        "import" => import_text::render_import(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
