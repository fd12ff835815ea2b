use std::cmp;

use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

const INDENT: usize = 2;
const COLUMN_GAP: usize = 2;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

/// `R$ 1234,56`: two decimals, comma separator, no thousands grouping.
pub fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}R$ {}", comma_decimal(amount.abs()))
}

/// `50,00 Km`.
pub fn distance(km: f64) -> String {
    format!("{} Km", comma_decimal(km))
}

fn comma_decimal(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| {
            let fill = " ".repeat(label_width - label.chars().count());
            format!("{padding}{label}{fill}  {value}")
        })
        .collect()
}

/// Aligned table when it fits `max_width`, otherwise one labelled block per
/// row.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let mut widths = columns
        .iter()
        .map(|column| column.name.chars().count())
        .collect::<Vec<usize>>();
    for row in rows {
        for (slot, value) in widths.iter_mut().zip(row) {
            *slot = cmp::max(*slot, value.chars().count());
        }
    }

    let total = INDENT + widths.iter().sum::<usize>() + COLUMN_GAP * (widths.len() - 1);
    if total > max_width {
        return render_blocks(columns, rows, block_label);
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<_>>();
    let mut output = vec![format_row(columns, &header, &widths)];
    output.extend(rows.iter().map(|row| format_row(columns, row, &widths)));
    output
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (column, width))| {
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            let fill = " ".repeat(width.saturating_sub(value.chars().count()));
            match column.align {
                Align::Left => format!("{value}{fill}"),
                Align::Right => format!("{fill}{value}"),
            }
        })
        .collect::<Vec<_>>();

    format!("{}{}", " ".repeat(INDENT), pieces.join("  ").trim_end())
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("  {block_label} {}:", row_index + 1));

        let entries = columns
            .iter()
            .enumerate()
            .map(|(index, column)| (column.name, row.get(index).cloned().unwrap_or_default()))
            .collect::<Vec<(&str, String)>>();
        output.extend(key_value_rows(&entries, 4));
    }
    output
}

pub fn value_str<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

pub fn value_f64(data: &Value, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

pub fn period_label(data: &Value) -> String {
    data.get("period")
        .map(|period| value_str(period, "label").to_string())
        .unwrap_or_default()
}
