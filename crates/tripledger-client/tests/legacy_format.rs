mod support;

use std::fs;

use rusqlite::Connection;
use serde_json::{Value, json};
use support::ledger_testkit::{
    add_revenue, approx, list_rows, may_2024, number, payload, summary_data, temp_home_in_tmp,
};
use tripledger_client::commands::import::{self, ImportRunOptions};
use tripledger_client::ledger::record::RecordId;
use tripledger_client::ledger::store::RecordStore;
use tripledger_client::setup::ensure_initialized_at;
use tripledger_client::storage::{RECORDS_KEY, RecordStorage, SqliteKvStorage};

fn browser_export() -> Value {
    json!([
        {
            "id": 1709990000000_u64,
            "tipo": "receita",
            "data": "2024-03-09",
            "valor": 80.5,
            "cliente": "Ana",
            "destino": "Shopping",
            "kmPercorrido": 12.3,
            "coordInicio": "-23.55,-46.63",
            "coordFim": ""
        },
        {
            "id": 1709990000001_u64,
            "tipo": "despesa",
            "data": "2024-03-10",
            "valor": 50,
            "categoria": "Combustível",
            "descricao": "Posto"
        },
        {
            "id": 1709990000002_u64,
            "tipo": "despesa",
            "data": "2024-03-11",
            "valor": 15,
            "categoria": "Lavagem",
            "descricao": ""
        }
    ])
}

fn write_export(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("export.json");
    let written = fs::write(&path, browser_export().to_string());
    assert!(written.is_ok());
    path
}

#[test]
fn browser_export_imports_with_ids_intact() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let path = write_export(dir.path());

        let imported = payload(import::run_with_options(ImportRunOptions {
            path: path.clone(),
            home_override: Some(&home),
        }));
        assert_eq!(imported["command"], "import");
        assert_eq!(imported["data"]["summary"]["inserted"], 3);

        let rows = list_rows(&home, 3, 2024);
        let ids = rows
            .iter()
            .map(|row| row["id"].as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert!(ids.contains(&"1709990000000".to_string()));

        let revenue = rows.iter().find(|row| row["kind"] == "revenue");
        assert!(revenue.is_some());
        if let Some(row) = revenue {
            assert_eq!(row["start_coord"]["lat"], -23.55);
            assert!(row.get("end_coord").is_none());
        }

        let again = payload(import::run_with_options(ImportRunOptions {
            path,
            home_override: Some(&home),
        }));
        assert_eq!(again["data"]["summary"]["inserted"], 0);
        assert_eq!(again["data"]["summary"]["skipped_existing"], 3);
    }
}

#[test]
fn unknown_category_keeps_its_label_and_gets_the_fallback_color() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let path = write_export(dir.path());
        payload(import::run_with_options(ImportRunOptions {
            path,
            home_override: Some(&home),
        }));

        let data = summary_data(&home, 3, 2024);
        let breakdown = data["category_breakdown"].as_array().cloned().unwrap_or_default();
        let washing = breakdown.iter().find(|row| row["category"] == "Lavagem");
        assert!(washing.is_some());
        if let Some(row) = washing {
            assert_eq!(row["color"], "#cccccc");
        }
        assert!(approx(number(&data["totals"]["expense"]), 65.0));
        assert!(approx(number(&data["totals"]["total_distance_km"]), 12.3));
    }
}

#[test]
fn saved_collection_keeps_the_browser_layout() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let path = write_export(dir.path());
        payload(import::run_with_options(ImportRunOptions {
            path,
            home_override: Some(&home),
        }));

        let setup = ensure_initialized_at(&home);
        assert!(setup.is_ok());
        if let Ok(context) = setup {
            let raw = SqliteKvStorage::new(&context.db_path).read_value(RECORDS_KEY);
            assert!(matches!(raw, Ok(Some(_))));
            if let Ok(Some(body)) = raw {
                let parsed = serde_json::from_str::<Value>(&body);
                assert!(parsed.is_ok());
                if let Ok(Value::Array(items)) = parsed {
                    assert_eq!(items[0]["tipo"], "receita");
                    assert_eq!(items[0]["id"], 1709990000000_u64);
                    assert_eq!(items[0]["coordInicio"], "-23.55,-46.63");
                    assert!(items[0]["coordFim"].is_null());
                    assert_eq!(items[1]["categoria"], "Combustível");
                }
            }
        }
    }
}

#[test]
fn unreadable_export_is_reported() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let path = dir.path().join("broken.json");
        assert!(fs::write(&path, "{not json").is_ok());

        let result = import::run_with_options(ImportRunOptions {
            path,
            home_override: Some(&home),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "legacy_import_unreadable");
        }
    }
}

#[test]
fn corrupt_stored_payload_is_backed_up_and_the_ledger_starts_empty() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let setup = ensure_initialized_at(&home);
        assert!(setup.is_ok());
        if let Ok(context) = setup {
            let connection = Connection::open(&context.db_path);
            assert!(connection.is_ok());
            if let Ok(conn) = connection {
                let inserted = conn.execute(
                    "INSERT INTO internal_kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                    [RECORDS_KEY, "[{broken", "2024-01-01T00:00:00Z"],
                );
                assert!(inserted.is_ok());
            }

            assert!(list_rows(&home, 5, 2024).is_empty());

            let storage = SqliteKvStorage::new(&context.db_path);
            assert!(storage.load().is_err());
            let backup = storage.read_value(&format!("{RECORDS_KEY}.unreadable"));
            assert!(matches!(backup, Ok(Some(ref body)) if body == "[{broken"));
        }
    }
}

const PARTLY_MALFORMED: &str = r#"[
    {"id": 1, "tipo": "receita", "data": "2024-03-09", "valor": 80, "cliente": "Ana", "destino": "Centro"},
    {"id": 2, "tipo": "despesa", "data": "2024-03-10", "valor": null, "categoria": "Combustível"},
    {"id": 3, "tipo": "despesa", "valor": 9, "categoria": "Refeição"}
]"#;

#[test]
fn one_malformed_stored_record_does_not_hide_the_rest() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let setup = ensure_initialized_at(&home);
        assert!(setup.is_ok());
        if let Ok(context) = setup {
            let storage = SqliteKvStorage::new(&context.db_path);
            assert!(storage.write_value(RECORDS_KEY, PARTLY_MALFORMED).is_ok());

            let store = RecordStore::open(storage.clone(), may_2024());
            let ids = store
                .records()
                .iter()
                .map(|record| record.id().clone())
                .collect::<Vec<_>>();
            assert_eq!(ids, vec![RecordId::Legacy(1), RecordId::Legacy(3)]);
            assert!(store.records()[1].date().is_none());

            let backup = storage.read_value(&format!("{RECORDS_KEY}.unreadable"));
            assert!(matches!(backup, Ok(Some(ref body)) if body == PARTLY_MALFORMED));

            add_revenue(&home, "2024-03-20", 20.0, None);
            let march = list_rows(&home, 3, 2024);
            assert_eq!(march.len(), 2);
            assert!(march.iter().any(|row| row["id"] == "1"));

            let saved = storage.load();
            assert!(matches!(saved, Ok(Some(ref records)) if records.len() == 3));
        }
    }
}

#[test]
fn import_skips_malformed_entries_and_keeps_the_good_ones() {
    let temp = temp_home_in_tmp("tripledger-legacy");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        let path = dir.path().join("partial.json");
        assert!(fs::write(&path, PARTLY_MALFORMED).is_ok());

        let imported = payload(import::run_with_options(ImportRunOptions {
            path,
            home_override: Some(&home),
        }));
        assert_eq!(imported["data"]["summary"]["inserted"], 2);
        assert_eq!(imported["data"]["skipped_malformed"], 1);
        assert!(
            imported["data"]["message"]
                .as_str()
                .unwrap_or_default()
                .ends_with("Skipped 1 malformed record(s).")
        );

        let march = list_rows(&home, 3, 2024);
        assert_eq!(march.len(), 1);
        assert_eq!(march[0]["id"], "1");
    }
}
