//! Whole-collection persistence. The ledger is written as one JSON array under
//! a single key and rewritten in full on every mutation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::{debug, warn};

use crate::ledger::capture::CaptureState;
use crate::ledger::record::{TripRecord, decode_record_array};
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

/// Key used by the browser version of the ledger; kept so exported data
/// imports without translation.
pub const RECORDS_KEY: &str = "controleGastosMotorista";
pub const CAPTURE_SESSION_KEY: &str = "tripledger.capture_session";

pub trait RecordStorage {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> ClientResult<Option<Vec<TripRecord>>>;

    fn persist(&self, records: &[TripRecord]) -> ClientResult<()>;
}

#[derive(Debug, Clone)]
pub struct SqliteKvStorage {
    db_path: PathBuf,
}

impl SqliteKvStorage {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn read_value(&self, key: &str) -> ClientResult<Option<String>> {
        let connection = open_connection(&self.db_path)?;
        connection
            .query_row(
                "SELECT value FROM internal_kv WHERE key = ?1 LIMIT 1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|error| map_sqlite_error(&self.db_path, &error))
    }

    pub fn write_value(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut connection = open_connection(&self.db_path)?;
        let transaction = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|error| map_sqlite_error(&self.db_path, &error))?;

        transaction
            .execute(
                "INSERT INTO internal_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|error| map_sqlite_error(&self.db_path, &error))?;

        transaction
            .commit()
            .map_err(|error| map_sqlite_error(&self.db_path, &error))
    }

    pub fn delete_value(&self, key: &str) -> ClientResult<()> {
        let connection = open_connection(&self.db_path)?;
        connection
            .execute("DELETE FROM internal_kv WHERE key = ?1", [key])
            .map_err(|error| map_sqlite_error(&self.db_path, &error))?;
        Ok(())
    }

    pub fn load_capture_state(&self) -> ClientResult<Option<CaptureState>> {
        let Some(raw) = self.read_value(CAPTURE_SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<CaptureState>(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(error) => {
                warn!(%error, "discarding unreadable capture session");
                Ok(None)
            }
        }
    }

    pub fn persist_capture_state(&self, state: &CaptureState) -> ClientResult<()> {
        if matches!(state, CaptureState::Idle) {
            return self.delete_value(CAPTURE_SESSION_KEY);
        }
        let body = serde_json::to_string(state)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        self.write_value(CAPTURE_SESSION_KEY, &body)
    }
}

impl RecordStorage for SqliteKvStorage {
    fn load(&self) -> ClientResult<Option<Vec<TripRecord>>> {
        let Some(raw) = self.read_value(RECORDS_KEY)? else {
            return Ok(None);
        };

        // Keep any payload the next save would lose.
        let backup_key = format!("{RECORDS_KEY}.unreadable");
        match decode_record_array(&raw) {
            Ok(decoded) => {
                if decoded.skipped > 0 {
                    self.write_value(&backup_key, &raw)?;
                    warn!(
                        skipped = decoded.skipped,
                        backup_key = %backup_key,
                        "ledger held malformed records"
                    );
                }
                debug!(count = decoded.records.len(), "loaded ledger records");
                Ok(Some(decoded.records))
            }
            Err(error) => {
                self.write_value(&backup_key, &raw)?;
                Err(ClientError::ledger_corrupt(&self.db_path).with_data(serde_json::json!({
                    "detail": error.to_string(),
                    "backup_key": backup_key,
                })))
            }
        }
    }

    fn persist(&self, records: &[TripRecord]) -> ClientResult<()> {
        let body = serde_json::to_string(records)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        self.write_value(RECORDS_KEY, &body)?;
        debug!(count = records.len(), "persisted ledger records");
        Ok(())
    }
}

/// In-process storage for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<Option<Vec<TripRecord>>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn with_records(records: Vec<TripRecord>) -> Self {
        Self {
            records: Mutex::new(Some(records)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every following `persist` fail, to exercise rollback paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Option<Vec<TripRecord>> {
        self.records.lock().ok().and_then(|guard| guard.clone())
    }
}

impl RecordStorage for MemoryStorage {
    fn load(&self) -> ClientResult<Option<Vec<TripRecord>>> {
        let guard = self
            .records
            .lock()
            .map_err(|_| ClientError::internal_serialization("memory storage lock poisoned"))?;
        Ok(guard.clone())
    }

    fn persist(&self, records: &[TripRecord]) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::ledger_init_failed(
                Path::new(":memory:"),
                "writes are disabled",
            ));
        }
        let mut guard = self
            .records
            .lock()
            .map_err(|_| ClientError::internal_serialization("memory storage lock poisoned"))?;
        *guard = Some(records.to_vec());
        Ok(())
    }
}
