//! Uniform result envelope returned by every generation tool.
//!
//! The envelope is the only thing a generation tool hands back to the agent:
//! failures are values, never MCP protocol errors.

use ark_mcp_common::error::Error;
use serde::Serialize;
use serde_json::Value;

/// `{success, data?, error?, message}`.
///
/// `success == true` iff `data` is present and `error` is absent. The
/// constructors are the only way to build one, which keeps that invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    message: String,
}

impl GenerationResult {
    /// Successful outcome carrying a payload.
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: message.into(),
        }
    }

    /// Failed outcome carrying the failure description.
    pub fn fail(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: message.into(),
        }
    }

    /// Fold an operation outcome into an envelope.
    pub fn from_outcome(
        outcome: Result<Value, Error>,
        success_message: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        match outcome {
            Ok(data) => Self::ok(data, success_message),
            Err(e) => Self::fail(e.to_string(), failure_message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the envelope as pretty JSON for MCP text content.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                r#"{{"success": false, "error": "failed to serialize result: {}", "message": "{}"}}"#,
                e, self.message
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_has_data_and_no_error() {
        let result = GenerationResult::ok(json!({"url": "https://img"}), "done");
        assert!(result.is_success());
        assert_eq!(result.data(), Some(&json!({"url": "https://img"})));
        assert_eq!(result.error(), None);
        assert_eq!(result.message(), "done");
    }

    #[test]
    fn fail_has_error_and_no_data() {
        let result = GenerationResult::fail("boom", "Image generation failed");
        assert!(!result.is_success());
        assert_eq!(result.data(), None);
        assert_eq!(result.error(), Some("boom"));
    }

    #[test]
    fn failed_outcome_uses_error_display() {
        let result = GenerationResult::from_outcome(
            Err(Error::MissingCredential),
            "ok",
            "Image generation failed",
        );
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("ARK_API_KEY"));
        assert_eq!(result.message(), "Image generation failed");
    }

    #[test]
    fn serialized_failure_omits_data() {
        let value = serde_json::to_value(GenerationResult::fail("boom", "failed")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom", "message": "failed"}));
    }

    #[test]
    fn serialized_success_omits_error() {
        let value = serde_json::to_value(GenerationResult::ok(json!([1, 2]), "ok")).unwrap();
        assert_eq!(value, json!({"success": true, "data": [1, 2], "message": "ok"}));
    }

    #[test]
    fn json_string_parses_back() {
        let result = GenerationResult::ok(json!({"k": "v"}), "ok");
        let parsed: Value = serde_json::from_str(&result.to_json_string()).unwrap();
        assert_eq!(parsed, serde_json::to_value(&result).unwrap());
        assert_eq!(parsed["data"], json!({"k": "v"}));
    }
}
