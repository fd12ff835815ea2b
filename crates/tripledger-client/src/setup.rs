use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::config::LedgerConfig;
use crate::migrations::{KV_TABLE, REQUIRED_META_KEYS, run_pending};
use crate::state::{ensure_ledger_directory, map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

const INTERNAL_META_COLUMNS: [&str; 2] = ["key", "value"];
const INTERNAL_KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];
const EXPECTED_USER_VERSION: i64 = 1;

const REQUIRED_CORE_TABLES: [(&str, &[&str]); 2] = [
    ("internal_meta", &INTERNAL_META_COLUMNS),
    (KV_TABLE, &INTERNAL_KV_COLUMNS),
];

#[derive(Debug, Clone)]
pub struct SetupContext {
    pub db_path: PathBuf,
    pub schema_version: String,
    pub capture_timeout: Duration,
}

pub fn ensure_initialized() -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(None)
}

pub fn ensure_initialized_at(home_override: &Path) -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(Some(home_override))
}

pub fn ensure_initialized_with_home_override(
    home_override: Option<&Path>,
) -> ClientResult<SetupContext> {
    let config = LedgerConfig::resolve(home_override)?;
    ensure_ledger_directory(&config.home)?;

    let db_path = config.db_path;
    let mut connection = open_connection(&db_path)?;

    run_pending(&mut connection).map_err(|error| map_migration_error(&db_path, &error))?;

    verify_core_tables(&connection, &db_path)?;
    repair_meta_keys(&connection, &db_path)?;
    verify_meta_keys(&connection, &db_path)?;

    let schema_version = read_schema_version(&connection, &db_path)?;

    Ok(SetupContext {
        db_path,
        schema_version,
        capture_timeout: config.capture_timeout,
    })
}

fn map_migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> ClientError {
    match error {
        rusqlite_migration::Error::RusqliteError { query: _, err } => {
            let mapped = map_sqlite_error(db_path, err);
            if mapped.code == "ledger_locked"
                || mapped.code == "ledger_corrupt"
                || mapped.code == "ledger_init_permission_denied"
            {
                mapped
            } else {
                ClientError::migration_failed(db_path, &error.to_string())
            }
        }
        _ => ClientError::migration_failed(db_path, &error.to_string()),
    }
}

fn verify_core_tables(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    let user_version = connection
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if user_version != EXPECTED_USER_VERSION {
        return Err(ClientError::ledger_corrupt(db_path));
    }

    for (table_name, required_columns) in REQUIRED_CORE_TABLES {
        let columns = table_columns(connection, table_name, db_path)?;
        if columns.is_empty() {
            return Err(ClientError::ledger_corrupt(db_path));
        }
        for required_column in required_columns {
            if !columns.iter().any(|column| column == required_column) {
                return Err(ClientError::ledger_corrupt(db_path));
            }
        }
    }

    Ok(())
}

fn repair_meta_keys(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    // Insert-only: a missing key is restored, a drifted value fails verification.
    for (meta_key, default_value) in REQUIRED_META_KEYS {
        connection
            .execute(
                "INSERT OR IGNORE INTO internal_meta (key, value) VALUES (?1, ?2)",
                params![meta_key, default_value],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;
    }
    Ok(())
}

fn verify_meta_keys(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    for (meta_key, expected_value) in REQUIRED_META_KEYS {
        let value = read_meta(connection, meta_key, db_path)?;
        if value.as_deref() != Some(expected_value) {
            return Err(ClientError::ledger_corrupt(db_path));
        }
    }
    Ok(())
}

fn table_columns(
    connection: &Connection,
    table_name: &str,
    db_path: &Path,
) -> ClientResult<Vec<String>> {
    if !REQUIRED_CORE_TABLES
        .iter()
        .any(|(required_name, _)| *required_name == table_name)
    {
        return Err(ClientError::ledger_init_failed(
            db_path,
            "Refused PRAGMA table inspection for non-core table.",
        ));
    }

    // `table_name` comes from REQUIRED_CORE_TABLES only.
    let sql = format!("PRAGMA table_info({table_name})");
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let column_iter = statement
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut columns = Vec::new();
    for row in column_iter {
        columns.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }

    Ok(columns)
}

fn read_meta(connection: &Connection, key: &str, db_path: &Path) -> ClientResult<Option<String>> {
    connection
        .query_row(
            "SELECT value FROM internal_meta WHERE key = ?1 LIMIT 1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn read_schema_version(connection: &Connection, db_path: &Path) -> ClientResult<String> {
    Ok(read_meta(connection, "schema_version", db_path)?.unwrap_or_else(|| "v1".to_string()))
}
