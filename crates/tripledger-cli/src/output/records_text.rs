use std::io;

use serde_json::Value;

use super::format::{
    self, Align, Column, distance, money, period_label, value_f64, value_str,
};

pub fn render_record_submit(data: &Value) -> io::Result<String> {
    let record = data
        .get("record")
        .ok_or_else(|| io::Error::other("submit output requires record"))?;

    let kind = value_str(record, "kind");
    let mut lines = vec![match kind {
        "revenue" => "Revenue saved.".to_string(),
        _ => "Expense saved.".to_string(),
    }];
    lines.push(String::new());

    let mut entries = vec![
        ("ID:", value_str(record, "id").to_string()),
        ("Date:", display_date(record)),
        ("Amount:", money(value_f64(record, "amount"))),
    ];
    if kind == "revenue" {
        entries.push(("Client:", value_str(record, "client_name").to_string()));
        entries.push(("Destination:", value_str(record, "destination").to_string()));
        let source = match value_str(data, "distance_source") {
            "capture" => " (measured)",
            _ => "",
        };
        entries.push((
            "Distance:",
            format!("{}{source}", distance(value_f64(record, "distance_km"))),
        ));
    } else {
        entries.push(("Category:", value_str(record, "category").to_string()));
        let description = value_str(record, "description");
        if !description.is_empty() {
            entries.push(("Description:", description.to_string()));
        }
    }
    lines.extend(format::key_value_rows(&entries, 2));

    if data.get("capture_cleared").and_then(Value::as_bool) == Some(true) {
        lines.push(String::new());
        lines.push("The measured trip was attached and cleared.".to_string());
    }

    if let Some(totals) = data.get("totals") {
        lines.push(String::new());
        lines.push(format!("{}:", period_label(data)));
        lines.extend(totals_rows(totals));
    }

    Ok(lines.join("\n"))
}

pub fn render_records_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("records list output requires rows"))?;

    let label = period_label(data);
    if rows.is_empty() {
        return Ok(format!(
            "No records in {label}.\n\nAdd one with `tripledger revenue add` or `tripledger expense add`."
        ));
    }

    let columns = [
        Column {
            name: "Date",
            align: Align::Left,
        },
        Column {
            name: "Type",
            align: Align::Left,
        },
        Column {
            name: "Details",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "ID",
            align: Align::Left,
        },
    ];
    let table_rows = rows.iter().map(list_row).collect::<Vec<_>>();

    let mut lines = vec![format!("Records for {label} ({}):", rows.len()), String::new()];
    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Record",
    ));
    Ok(lines.join("\n"))
}

pub fn render_record_delete(data: &Value) -> io::Result<String> {
    let record_id = value_str(data, "record_id");
    let mut lines = Vec::new();
    match value_str(data, "outcome") {
        "deleted" => lines.push(format!("Record {record_id} deleted.")),
        "declined" => {
            lines.push(format!("Record {record_id} was kept."));
            return Ok(lines.join("\n"));
        }
        other => {
            return Err(io::Error::other(format!(
                "unexpected delete outcome `{other}`"
            )));
        }
    }

    if let Some(totals) = data.get("totals") {
        lines.push(String::new());
        lines.push(format!("{} now:", period_label(data)));
        lines.extend(totals_rows(totals));
    }
    Ok(lines.join("\n"))
}

pub fn totals_rows(totals: &Value) -> Vec<String> {
    format::key_value_rows(
        &[
            ("Revenue:", money(value_f64(totals, "revenue"))),
            ("Expenses:", money(value_f64(totals, "expense"))),
            ("Balance:", money(value_f64(totals, "balance"))),
            ("Distance:", distance(value_f64(totals, "total_distance_km"))),
        ],
        2,
    )
}

fn list_row(record: &Value) -> Vec<String> {
    let (kind, details) = match value_str(record, "kind") {
        "revenue" => (
            "Revenue",
            format!(
                "{} to {} ({})",
                value_str(record, "client_name"),
                value_str(record, "destination"),
                distance(value_f64(record, "distance_km"))
            ),
        ),
        _ => {
            let description = value_str(record, "description");
            let category = value_str(record, "category");
            let details = if description.is_empty() {
                category.to_string()
            } else {
                format!("{category}: {description}")
            };
            ("Expense", details)
        }
    };

    vec![
        display_date(record),
        kind.to_string(),
        details,
        money(value_f64(record, "amount")),
        value_str(record, "id").to_string(),
    ]
}

fn display_date(record: &Value) -> String {
    match record.get("display_date").and_then(Value::as_str) {
        Some(date) => date.to_string(),
        None => value_str(record, "date").to_string(),
    }
}
