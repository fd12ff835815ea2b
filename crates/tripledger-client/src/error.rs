use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::ledger::capture::CaptureError;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `tripledger {cmd} --help` for usage."),
            None => "Run `tripledger --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    /// A required form field is missing or holds an unusable value.
    pub fn validation_failed(field: &str, message: &str) -> Self {
        Self::new(
            "validation_failed",
            message,
            vec![format!("Fix `{field}` and submit the record again.")],
        )
        .with_data(json!({
            "field": field,
        }))
    }

    pub fn record_not_found(record_id: &str) -> Self {
        Self::new(
            "record_not_found",
            &format!("Record `{record_id}` was not found."),
            vec![
                "Run `tripledger records list` for the period the record belongs to.".to_string(),
                "Retry with `tripledger records delete <id>`.".to_string(),
            ],
        )
        .with_data(json!({
            "record_id": record_id,
        }))
    }

    pub fn capture_state_conflict(state: &str, attempted: &str) -> Self {
        let recovery = match attempted {
            "end" => vec![
                "Run `tripledger trip start` to capture the starting point first.".to_string(),
                "Check progress with `tripledger trip status`.".to_string(),
            ],
            _ => vec![
                "Finish the current capture with `tripledger trip end`.".to_string(),
                "Or discard it with `tripledger trip reset`.".to_string(),
            ],
        };
        Self::new(
            "capture_state_conflict",
            &format!("Cannot {attempted} a trip capture while the capture is `{state}`."),
            recovery,
        )
        .with_data(json!({
            "state": state,
            "attempted": attempted,
        }))
    }

    pub fn from_capture_error(error: &CaptureError) -> Self {
        let recovery = match error {
            CaptureError::Unavailable => vec![
                "Pass the current position with `--at <lat,lng>`.".to_string(),
                "Then retry `tripledger trip start`.".to_string(),
            ],
            CaptureError::PermissionDenied => {
                vec!["Allow location access for the position provider and retry.".to_string()]
            }
            CaptureError::Timeout { .. } => vec![
                "Move somewhere with a clearer signal and retry.".to_string(),
                "Raise `TRIPLEDGER_CAPTURE_TIMEOUT_MS` if the provider is slow.".to_string(),
            ],
        };
        Self::new(error.code(), &error.to_string(), recovery)
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `TRIPLEDGER_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid ledger file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    pub fn legacy_import_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "legacy_import_unreadable",
            &format!("Could not read legacy records from `{location}`: {detail}"),
            vec![
                "Export the browser data as a JSON array of records.".to_string(),
                "Retry with `tripledger import --legacy <path>`.".to_string(),
            ],
        )
    }

    /// Failures the user cannot fix by changing their input.
    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_")
            || matches!(
                self.code.as_str(),
                "ledger_init_permission_denied"
                    | "ledger_locked"
                    | "ledger_corrupt"
                    | "migration_failed"
                    | "ledger_init_failed"
            )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
