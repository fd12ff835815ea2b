use serde::Serialize;
use serde_json::Value;

use crate::API_VERSION;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    pub ok: bool,
    pub command: String,
    pub version: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub ok: bool,
    pub error: ErrorContract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorContract {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

/// Wraps command output; `command` selects the renderer on the CLI side.
pub fn success<T>(command: &str, data: T) -> ClientResult<SuccessEnvelope>
where
    T: Serialize,
{
    let json_data = serde_json::to_value(data)
        .map_err(|err| ClientError::internal_serialization(&err.to_string()))?;
    Ok(SuccessEnvelope {
        ok: true,
        command: command.to_string(),
        version: API_VERSION.to_string(),
        data: json_data,
    })
}

impl From<&ClientError> for FailureEnvelope {
    fn from(error: &ClientError) -> Self {
        Self {
            ok: false,
            error: ErrorContract {
                code: error.code.clone(),
                message: error.message.clone(),
                recovery_steps: error.recovery_steps.clone(),
            },
            data: error.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FailureEnvelope, success};
    use crate::ClientError;

    #[test]
    fn success_carries_command_and_version() {
        let envelope = success("summary", json!({"records": 0}));
        assert!(envelope.is_ok());
        if let Ok(value) = envelope {
            assert!(value.ok);
            assert_eq!(value.command, "summary");
            assert_eq!(value.data["records"], json!(0));
        }
    }

    #[test]
    fn failure_keeps_error_data() {
        let error = ClientError::record_not_found("rec_1");
        let envelope = FailureEnvelope::from(&error);
        assert!(!envelope.ok);
        assert_eq!(envelope.error.code, "record_not_found");
        assert_eq!(
            envelope.data.as_ref().and_then(|data| data.get("record_id")),
            Some(&json!("rec_1"))
        );
    }
}
