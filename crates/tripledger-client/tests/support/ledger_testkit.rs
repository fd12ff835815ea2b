use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use tempfile::{Builder, TempDir};
use tripledger_client::ClientResult;
use tripledger_client::SuccessEnvelope;
use tripledger_client::commands::expense::{self, ExpenseAddOptions};
use tripledger_client::commands::records::{self, RecordsListOptions};
use tripledger_client::commands::revenue::{self, RevenueAddOptions};
use tripledger_client::commands::summary::{self, SummaryOptions};

pub fn temp_home_in_tmp(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir_in("/tmp")?;
    let home = dir.path().join("ledger-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

pub fn may_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default()
}

pub fn payload(result: ClientResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok());
    if let Ok(success) = result {
        let value = serde_json::to_value(success);
        assert!(value.is_ok());
        if let Ok(json) = value {
            return json;
        }
    }
    Value::Null
}

pub fn add_revenue(home: &Path, date: &str, amount: f64, km: Option<f64>) -> Value {
    payload(revenue::add_with_options(RevenueAddOptions {
        client_name: "Maria".to_string(),
        destination: "Airport".to_string(),
        amount,
        date: Some(date.to_string()),
        distance_km: km,
        home_override: Some(home),
        today: Some(may_2024()),
    }))
}

pub fn add_expense(home: &Path, date: &str, category: &str, amount: f64) -> Value {
    payload(expense::add_with_options(ExpenseAddOptions {
        category: category.to_string(),
        description: format!("{category} on {date}"),
        amount,
        date: Some(date.to_string()),
        home_override: Some(home),
        today: Some(may_2024()),
    }))
}

pub fn summary_data(home: &Path, month: u32, year: i32) -> Value {
    payload(summary::run_with_options(SummaryOptions {
        month: Some(month),
        year: Some(year),
        home_override: Some(home),
        today: Some(may_2024()),
    }))["data"]
        .clone()
}

pub fn list_rows(home: &Path, month: u32, year: i32) -> Vec<Value> {
    payload(records::list_with_options(RecordsListOptions {
        month: Some(month),
        year: Some(year),
        home_override: Some(home),
        today: Some(may_2024()),
    }))["data"]["rows"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-6
}

pub fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}
