use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const REQUIRED_META_KEYS: [(&str, &str); 2] =
    [("schema_version", "v1"), ("storage_layout", "kv_json_v1")];

pub const KV_TABLE: &str = "internal_kv";

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{KV_TABLE, REQUIRED_META_KEYS, run_pending};

    #[test]
    fn bootstrap_creates_kv_table_and_meta_keys() {
        let opened = Connection::open_in_memory();
        assert!(opened.is_ok());
        if let Ok(mut connection) = opened {
            assert!(run_pending(&mut connection).is_ok());
            assert!(run_pending(&mut connection).is_ok());

            let table = connection.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [KV_TABLE],
                |row| row.get::<_, i64>(0),
            );
            assert_eq!(table.ok(), Some(1));

            for (key, expected) in REQUIRED_META_KEYS {
                let value = connection.query_row(
                    "SELECT value FROM internal_meta WHERE key = ?1",
                    [key],
                    |row| row.get::<_, String>(0),
                );
                assert_eq!(value.ok().as_deref(), Some(expected));
            }
        }
    }
}
