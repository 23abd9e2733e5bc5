use crate::error::ConnectorError;
use rmcp::model::CallToolResult;
use serde_json::{json, Value};

pub(crate) const EMPTY_SUCCESS: &str = "Tool executed successfully";

/// Turn a tool result into the JSON value handed to callers.
///
/// Application-level errors become [`ConnectorError::Tool`] with the most
/// specific reason the result carries.
pub fn decode_tool_result(result: CallToolResult) -> Result<Value, ConnectorError> {
    if result.is_error == Some(true) {
        return Err(ConnectorError::Tool(error_reason(&result)));
    }

    let Some(first) = result.content.first() else {
        return Ok(result
            .structured_content
            .unwrap_or_else(|| json!({ "result": EMPTY_SUCCESS })));
    };

    match first.as_text() {
        Some(text) => Ok(serde_json::from_str(&text.text)
            .unwrap_or_else(|_| json!({ "result": text.text }))),
        None => Ok(json!({ "result": stringify(&result.content) })),
    }
}

fn error_reason(result: &CallToolResult) -> String {
    if let Some(text) = result.content.iter().find_map(|c| c.as_text()) {
        return text.text.clone();
    }
    match &result.structured_content {
        Some(Value::String(message)) => return message.clone(),
        Some(payload) => {
            if let Some(message) = payload
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
            {
                return message.to_string();
            }
        }
        None => {}
    }
    stringify(&result.content)
}

fn stringify<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unprintable tool output>".to_string())
}

/// Parse a resource body as JSON.
pub fn decode_resource(uri: &str, text: &str) -> Result<Value, ConnectorError> {
    serde_json::from_str(text)
        .map_err(|err| ConnectorError::Decode(format!("resource {uri} is not valid JSON: {err}")))
}
