//! Wire types for the W3C WebDriver protocol.
//!
//! Every response wraps its payload in a `value` field; errors carry an
//! `error` code and a human-readable `message` inside that same field.

use serde::Deserialize;

/// Generic success envelope.
#[derive(Debug, Deserialize)]
pub struct ValueResponse<T> {
    pub value: T,
}

/// Payload of a successful `POST /session`.
#[derive(Debug, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Payload of an error response.
#[derive(Debug, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_session_envelope() {
        let raw = r#"{"value":{"sessionId":"abc123","capabilities":{"browserName":"chrome"}}}"#;
        let parsed: ValueResponse<NewSessionValue> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.value.session_id, "abc123");
    }

    #[test]
    fn parses_error_envelope() {
        let raw = r#"{"value":{"error":"no such window","message":"window was closed"}}"#;
        let parsed: ValueResponse<ErrorValue> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.value.error, "no such window");
    }
}
