//! Uniform response envelope: `{ "status": .., "data": .. }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wrapper shape around every body-annotated response payload.
///
/// `message` is only serialized when set, so successful responses render as
/// exactly `{status, data}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status: u16, data: T) -> Self {
        Self {
            status,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(200, data)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<Value> {
    /// Error envelope: no payload, a status and a human-readable message.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Wrap an already-serialized payload, nesting it unchanged.
    pub fn wrap(status: u16, payload: Value) -> Value {
        let mut map = serde_json::Map::with_capacity(2);
        map.insert("status".to_string(), Value::from(status));
        map.insert("data".to_string(), payload);
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope_serializes_without_message() {
        let env = Envelope::ok(json!({"id": 7}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v, json!({"status": 200, "data": {"id": 7}}));
    }

    #[test]
    fn error_envelope_carries_message_and_null_data() {
        let v = serde_json::to_value(Envelope::error(400, "bad input")).unwrap();
        assert_eq!(v, json!({"status": 400, "message": "bad input", "data": null}));
    }

    #[test]
    fn wrap_nests_payload_unchanged() {
        let payload = json!([1, null, {"a": [true, "x"]}]);
        let wrapped = Envelope::wrap(201, payload.clone());
        assert_eq!(wrapped["status"], 201);
        assert_eq!(wrapped["data"], payload);
        assert_eq!(wrapped.as_object().unwrap().len(), 2);
    }
}
