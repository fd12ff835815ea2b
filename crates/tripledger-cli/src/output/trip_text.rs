use std::io;

use serde_json::Value;

use super::format::{self, distance, value_str};

pub fn render_capture(command: &str, data: &Value) -> io::Result<String> {
    let state = data
        .get("state")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("trip output requires state"))?;

    let headline = match (command, state) {
        ("trip reset", _) => "Trip capture cleared.",
        (_, "idle") => "No trip in progress.",
        (_, "start_captured") => "Start position captured. Run `tripledger trip end` at the destination.",
        (_, "completed") => "Trip measured. The next `tripledger revenue add` without --km uses it.",
        (_, "failed") => "Position capture failed.",
        _ => "Position request in progress.",
    };

    let mut lines = vec![headline.to_string()];
    let mut entries = vec![("State:", state.to_string())];
    if let Some(start) = data.get("start") {
        entries.push(("Start:", position(start)));
    }
    if let Some(end) = data.get("end") {
        entries.push(("End:", position(end)));
    }
    if let Some(km) = data.get("pending_distance_km").and_then(Value::as_f64) {
        let suffix = if data.get("round_trip").and_then(Value::as_bool) == Some(true) {
            " (round trip)"
        } else {
            ""
        };
        entries.push(("Distance:", format!("{}{suffix}", distance(km))));
    }
    lines.push(String::new());
    lines.extend(format::key_value_rows(&entries, 2));

    if let Some(failure) = data.get("failure") {
        lines.push(String::new());
        lines.push(format!(
            "  Error:    {} ({} step)",
            value_str(failure, "code"),
            value_str(failure, "stage")
        ));
        lines.push(format!("  Details:  {}", value_str(failure, "message")));
        let steps = failure
            .get("recovery_steps")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if !steps.is_empty() {
            lines.push(String::new());
            lines.push("What to do next:".to_string());
            for (index, step) in steps.iter().filter_map(Value::as_str).enumerate() {
                lines.push(format!("  {}. {step}", index + 1));
            }
        }
    }

    Ok(lines.join("\n"))
}

fn position(point: &Value) -> String {
    let lat = point.get("lat").and_then(Value::as_f64).unwrap_or(0.0);
    let lng = point.get("lng").and_then(Value::as_f64).unwrap_or(0.0);
    format!("{lat:.5}, {lng:.5}")
}
