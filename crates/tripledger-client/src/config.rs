use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ledger::capture::DEFAULT_CAPTURE_TIMEOUT;
use crate::state::{ledger_db_path, resolve_ledger_home};
use crate::{ClientError, ClientResult};

pub const CAPTURE_TIMEOUT_ENV_VAR: &str = "TRIPLEDGER_CAPTURE_TIMEOUT_MS";

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub capture_timeout: Duration,
}

impl LedgerConfig {
    /// Resolves the ledger home (override, `TRIPLEDGER_HOME`, `~/.tripledger`)
    /// and the capture timeout from the environment.
    pub fn resolve(home_override: Option<&Path>) -> ClientResult<Self> {
        let home = resolve_ledger_home(home_override)?;
        let capture_timeout =
            capture_timeout_from(std::env::var(CAPTURE_TIMEOUT_ENV_VAR).ok().as_deref())?;
        Ok(Self {
            db_path: ledger_db_path(&home),
            home,
            capture_timeout,
        })
    }
}

pub fn capture_timeout_from(raw: Option<&str>) -> ClientResult<Duration> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_CAPTURE_TIMEOUT);
    };

    match value.parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ClientError::invalid_argument_with_recovery(
            &format!("`{CAPTURE_TIMEOUT_ENV_VAR}` must be a positive number of milliseconds."),
            vec![format!(
                "Unset `{CAPTURE_TIMEOUT_ENV_VAR}` to use the 5000 ms default."
            )],
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::capture_timeout_from;

    #[test]
    fn timeout_defaults_to_five_seconds() {
        assert_eq!(capture_timeout_from(None).ok(), Some(Duration::from_millis(5000)));
        assert_eq!(capture_timeout_from(Some("  ")).ok(), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn timeout_accepts_positive_millis_only() {
        assert_eq!(capture_timeout_from(Some("1500")).ok(), Some(Duration::from_millis(1500)));
        assert!(capture_timeout_from(Some("0")).is_err());
        assert!(capture_timeout_from(Some("-3")).is_err());
        assert!(capture_timeout_from(Some("soon")).is_err());
    }
}
