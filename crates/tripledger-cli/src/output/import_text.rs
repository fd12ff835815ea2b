use std::io;

use serde_json::Value;

use super::format::{self, value_str};

pub fn render_import(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("import output requires summary"))?;
    let count = |key: &str| summary.get(key).and_then(Value::as_u64).unwrap_or(0);

    let skipped_malformed = data
        .get("skipped_malformed")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let mut entries = vec![
        ("Source:", value_str(data, "path").to_string()),
        ("Records read:", count("read").to_string()),
        ("Inserted:", count("inserted").to_string()),
        ("Already present:", count("skipped_existing").to_string()),
    ];
    if skipped_malformed > 0 {
        entries.push(("Malformed:", skipped_malformed.to_string()));
    }

    let mut lines = vec![value_str(data, "message").to_string(), String::new()];
    lines.extend(format::key_value_rows(&entries, 2));
    lines.push(String::new());
    lines.push("Run `tripledger periods` to see which months now have records.".to_string());
    Ok(lines.join("\n"))
}
