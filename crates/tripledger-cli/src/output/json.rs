use std::io;

use serde::Serialize;
use serde_json::json;
use tripledger_client::{ClientError, SuccessEnvelope};

const JSON_VERSION: &str = "v1";

/// `{ ok, version, data }`; the command name is implied by the invocation.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let payload = json!({
        "ok": true,
        "version": JSON_VERSION,
        "data": success.data,
    });
    serialize_json_pretty(&payload)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data {
        payload["error"]["data"] = data.clone();
    }
    serialize_json_pretty(&payload)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tripledger_client::{ClientError, SuccessEnvelope};

    use super::{render_error_json, render_success_json};

    #[test]
    fn success_json_wraps_data_in_versioned_envelope() {
        let payload = SuccessEnvelope {
            ok: true,
            command: "summary".to_string(),
            version: "0.1.0".to_string(),
            data: json!({"totals": {"balance": 60.0}}),
        };

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["version"], "v1");
                assert_eq!(value["data"]["totals"]["balance"], 60.0);
            }
        }
    }

    #[test]
    fn error_json_uses_universal_shape() {
        let error = ClientError::validation_failed("amount", "`amount` must be positive.");
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["error"]["code"], "validation_failed");
                assert_eq!(value["error"]["data"]["field"], "amount");
                assert!(value.get("ok").is_none());
            }
        }
    }
}
