//! Payload encoding for outbound events and rendering for the log.

use serde_json::Value;

use crate::error::CodecError;

/// An event payload: either a verbatim string or parsed JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    /// Wrap a value received off the wire.
    ///
    /// JSON strings become [`Payload::Text`] so that both directions render
    /// the same way.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Payload::Text(text),
            other => Payload::Json(other),
        }
    }

    /// The JSON value put on the wire for this payload.
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Text(text) => Value::String(text.clone()),
            Payload::Json(value) => value.clone(),
        }
    }
}

/// Turn operator-entered text into a payload.
///
/// Text whose trimmed form starts with `{` must parse as JSON; anything
/// else is sent verbatim as a string.
pub fn encode_for_send(raw: &str) -> Result<Payload, CodecError> {
    if raw.trim_start().starts_with('{') {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Payload::Json(value))
    } else {
        Ok(Payload::Text(raw.to_string()))
    }
}

/// Render a payload as single-line JSON.
pub fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => Value::String(text.clone()).to_string(),
        Payload::Json(value) => value.to_string(),
    }
}

/// Render the argument list of an inbound event.
///
/// A single argument is shown on its own, several as a JSON array.
pub fn describe_args(args: &[Value]) -> String {
    match args {
        [] => "(no payload)".to_string(),
        [single] => describe(&Payload::from_value(single.clone())),
        many => Value::Array(many.to_vec()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_json_object() {
        let payload = encode_for_send(r#"{"a":1}"#).unwrap();
        assert_eq!(payload, Payload::Json(json!({"a": 1})));
    }

    #[test]
    fn test_encode_plain_text_verbatim() {
        assert_eq!(
            encode_for_send("hello").unwrap(),
            Payload::Text("hello".to_string())
        );
        // Only the detection is trimmed; the string itself is kept as typed.
        assert_eq!(
            encode_for_send("  hi there ").unwrap(),
            Payload::Text("  hi there ".to_string())
        );
    }

    #[test]
    fn test_encode_leading_whitespace_json() {
        let payload = encode_for_send("   {\"nested\": {\"b\": [1, 2]}}").unwrap();
        assert_eq!(payload, Payload::Json(json!({"nested": {"b": [1, 2]}})));
    }

    #[test]
    fn test_encode_bad_json_fails() {
        let err = encode_for_send("{bad json").unwrap_err();
        assert!(matches!(err, CodecError::InvalidJson(_)));
    }

    #[test]
    fn test_arrays_and_numbers_are_sent_as_text() {
        // Only object-looking text is parsed.
        assert_eq!(
            encode_for_send("[1,2]").unwrap(),
            Payload::Text("[1,2]".to_string())
        );
        assert_eq!(encode_for_send("42").unwrap(), Payload::Text("42".to_string()));
    }

    #[test]
    fn test_describe_is_single_line_json() {
        let payload = encode_for_send("{\n  \"a\": 1,\n  \"b\": \"x\"\n}").unwrap();
        assert_eq!(describe(&payload), r#"{"a":1,"b":"x"}"#);
        assert_eq!(describe(&Payload::Text("hello".to_string())), r#""hello""#);
        assert_eq!(describe(&Payload::Json(json!(3.5))), "3.5");
        assert_eq!(describe(&Payload::Json(json!([1, "two"]))), r#"[1,"two"]"#);
    }

    #[test]
    fn test_describe_args() {
        assert_eq!(describe_args(&[]), "(no payload)");
        assert_eq!(describe_args(&[json!({"a": 1})]), r#"{"a":1}"#);
        assert_eq!(describe_args(&[json!("hi")]), r#""hi""#);
        assert_eq!(describe_args(&[json!(1), json!("b")]), r#"[1,"b"]"#);
    }

    #[test]
    fn test_payload_value_round_trip_for_strings() {
        let payload = Payload::from_value(json!("text"));
        assert_eq!(payload, Payload::Text("text".to_string()));
        assert_eq!(payload.to_value(), json!("text"));
    }
}
