use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, money, period_label, value_f64, value_str};
use super::records_text::totals_rows;

pub fn render_summary(data: &Value) -> io::Result<String> {
    let totals = data
        .get("totals")
        .ok_or_else(|| io::Error::other("summary output requires totals"))?;
    let count = data.get("record_count").and_then(Value::as_u64).unwrap_or(0);

    let mut lines = vec![
        format!("Summary for {} ({count} records):", period_label(data)),
        String::new(),
    ];
    lines.extend(totals_rows(totals));

    let breakdown = data
        .get("category_breakdown")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    lines.push(String::new());
    if breakdown.is_empty() {
        lines.push("No expenses in this period.".to_string());
        return Ok(lines.join("\n"));
    }

    lines.push("Expenses by category:".to_string());
    let expense_total = value_f64(totals, "expense");
    let columns = [
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Share",
            align: Align::Right,
        },
        Column {
            name: "Color",
            align: Align::Left,
        },
    ];
    let rows = breakdown
        .iter()
        .map(|row| {
            let amount = value_f64(row, "amount");
            let share = if expense_total > 0.0 {
                amount / expense_total * 100.0
            } else {
                0.0
            };
            vec![
                value_str(row, "category").to_string(),
                money(amount),
                format!("{share:.0}%"),
                value_str(row, "color").to_string(),
            ]
        })
        .collect::<Vec<_>>();
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Category",
    ));

    Ok(lines.join("\n"))
}

pub fn render_periods(data: &Value) -> io::Result<String> {
    let current = data
        .get("current")
        .ok_or_else(|| io::Error::other("periods output requires current"))?;

    let years = data
        .get("years")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_i64)
                .map(|year| year.to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let months = data
        .get("months")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .map(|month| {
                    format!(
                        "{} {}",
                        month.get("month").and_then(Value::as_u64).unwrap_or(0),
                        value_str(month, "name")
                    )
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut lines = vec![
        format!("Current period: {}", value_str(current, "label")),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Years:", years.join(", ")),
            ("Months:", months.join(", ")),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Filter with `--month <1-12> --year <yyyy>` on `records list` or `summary`.".to_string());
    Ok(lines.join("\n"))
}
