//! # Raw Payload Model
//!
//! The schema-agnostic form of an inbound event, used before the type a
//! handler expects is known.
//!
//! [`RawValue`] is a JSON tree whose objects keep their keys in insertion
//! order. It is produced once per inbound message by [`parse`] and is never
//! mutated afterwards; handlers receive typed values produced by [`decode`].
//!
//! # Decoding rules
//!
//! - Fields present in the payload but unknown to the target type are ignored,
//!   so newer event schemas never break older handlers.
//! - Fields of the target type that are absent from the payload either take
//!   their default (`Option`, `#[serde(default)]`) or fail with
//!   [`DecodeError`].
//! - Decoding never mutates or consumes the raw value, so one detail can be
//!   decoded into several payload types for fan-out.

use crate::error::{DecodeError, PayloadError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// A generic JSON-like value: object, array, string, number, boolean or null.
pub type RawValue = serde_json::Value;

/// An object inside a [`RawValue`], with insertion order preserved.
pub type RawObject = serde_json::Map<String, RawValue>;

/// The top-level kind of a [`RawValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
    /// `"..."`
    String,
    /// Integer or floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `null`
    Null,
}

impl Shape {
    /// Shape of the given value.
    pub fn of(value: &RawValue) -> Self {
        match value {
            RawValue::Object(_) => Shape::Object,
            RawValue::Array(_) => Shape::Array,
            RawValue::String(_) => Shape::String,
            RawValue::Number(_) => Shape::Number,
            RawValue::Bool(_) => Shape::Boolean,
            RawValue::Null => Shape::Null,
        }
    }

    /// Lowercase name of the shape.
    pub const fn as_str(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Boolean => "boolean",
            Shape::Null => "null",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse raw message bytes into a [`RawValue`].
///
/// Surrounding whitespace is ignored. Input that is empty after trimming, or
/// that is not well-formed JSON, fails with [`PayloadError`].
pub fn parse(bytes: &[u8]) -> Result<RawValue, PayloadError> {
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty);
    }
    serde_json::from_slice(trimmed).map_err(PayloadError::Parse)
}

/// Decode a raw value into the concrete type `T`.
///
/// The value is borrowed; decoding is structural and leaves it untouched.
pub fn decode<T: DeserializeOwned>(value: &RawValue) -> Result<T, DecodeError> {
    T::deserialize(value).map_err(|error| DecodeError::new::<T>(Shape::of(value), error))
}

/// Encode a typed value back into a [`RawValue`].
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<RawValue, PayloadError> {
    serde_json::to_value(value).map_err(PayloadError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct StateChange {
        instance_id: String,
        state: String,
        #[serde(default)]
        previous_state: Option<String>,
    }

    #[test]
    fn parse_trims_whitespace() {
        let value = parse(b"  \n {\"a\": 1}\n\t ").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn parse_rejects_empty_and_malformed_input() {
        assert!(matches!(parse(b"   "), Err(PayloadError::Empty)));
        assert!(matches!(parse(b"xyz"), Err(PayloadError::Parse(_))));
        assert!(matches!(parse(b"{\"a\":"), Err(PayloadError::Parse(_))));
    }

    #[test]
    fn parse_preserves_key_order() {
        let value = parse(br#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let detail = json!({"instanceId": "i-1", "state": "running", "newField": [1, 2]});
        let decoded: StateChange = decode(&detail).unwrap();
        assert_eq!(decoded.instance_id, "i-1");
        assert_eq!(decoded.previous_state, None);
    }

    #[test]
    fn decode_reports_missing_field() {
        let detail = json!({"state": "running"});
        let err = decode::<StateChange>(&detail).unwrap_err();
        assert_eq!(err.actual_shape, Shape::Object);
        assert!(err.expected_type.ends_with("StateChange"));
        assert!(err.reason().contains("instanceId"));
    }

    #[test]
    fn decode_reports_wrong_shape() {
        let err = decode::<StateChange>(&json!("i-1")).unwrap_err();
        assert_eq!(err.actual_shape, Shape::String);
        assert!(err.to_string().starts_with("cannot decode string into"));
    }

    #[test]
    fn encode_keeps_known_fields() {
        let detail = json!({"instanceId": "i-9", "state": "stopped", "extra": true});
        let decoded: StateChange = decode(&detail).unwrap();
        let encoded = encode(&decoded).unwrap();
        assert_eq!(encoded["instanceId"], detail["instanceId"]);
        assert_eq!(encoded["state"], detail["state"]);
        assert_eq!(encoded.get("extra"), None);
    }

    #[test]
    fn shape_names() {
        assert_eq!(Shape::of(&json!(null)).to_string(), "null");
        assert_eq!(Shape::of(&json!(1.5)), Shape::Number);
        assert_eq!(Shape::of(&json!(false)), Shape::Boolean);
        assert_eq!(Shape::of(&json!("x")).as_str(), "string");
    }
}
