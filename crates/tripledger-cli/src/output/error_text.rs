use serde_json::Value;
use tripledger_client::ClientError;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Something went wrong, but it's easy to fix.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    if let Some(field) = error_field(error) {
        lines.push(format!("  Field:    --{field}"));
    }
    lines.push(String::new());
    lines.push("What to do next:".to_string());

    let steps = if error.recovery_steps.is_empty() {
        vec!["Retry the command.".to_string()]
    } else {
        error.recovery_steps.clone()
    };
    lines.extend(
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| format!("  {}. {step}", index + 1)),
    );

    lines.join("\n")
}

fn error_field(error: &ClientError) -> Option<&str> {
    error
        .data
        .as_ref()
        .and_then(|data| data.get("field"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use tripledger_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_standard_error_layout() {
        let error = ClientError::record_not_found("rec_missing");

        let rendered = render_error(&error);
        assert!(rendered.starts_with("Something went wrong, but it's easy to fix."));
        assert!(rendered.contains("  Error:    record_not_found"));
        assert!(rendered.contains("rec_missing"));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. Run `tripledger records list`"));
        assert!(!rendered.contains("Field:"));
    }

    #[test]
    fn validation_errors_name_the_flag() {
        let error = ClientError::validation_failed("destination", "`destination` is required.");
        let rendered = render_error(&error);
        assert!(rendered.contains("  Field:    --destination"));
    }
}
