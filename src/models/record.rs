//! Accessors for untyped telemetry log records.

use serde_json::{Map, Value};


/// A telemetry log record: one order-preserving JSON object.
///
/// Records are deliberately untyped; the Gemini CLI emits a grab bag of
/// OpenTelemetry fields and only the handful read below matters here.
pub type LogRecord = Map<String, Value>;


/// Event name emitted for a completed API call.
pub const API_RESPONSE_EVENT: &str = "gemini_cli.api_response";

/// Event name emitted when an API call is issued.
pub const API_REQUEST_EVENT: &str = "gemini_cli.api_request";

/// Model name used when a record does not carry one.
pub const UNKNOWN_MODEL: &str = "unknown";


/// Get the `attributes` sub-object of a record, if present and an object.
pub fn attributes(record: &LogRecord) -> Option<&Map<String, Value>> {
    record.get("attributes").and_then(Value::as_object)
}


/// Get `attributes["event.name"]` as a string.
pub fn event_name(attributes: &Map<String, Value>) -> Option<&str> {
    attributes.get("event.name").and_then(Value::as_str)
}


/// Get `attributes["event.timestamp"]` as a string.
///
/// Timestamps are ISO-8601 and compared lexicographically; they are only
/// parsed into real datetimes at aggregation time.
pub fn event_timestamp(attributes: &Map<String, Value>) -> Option<&str> {
    attributes.get("event.timestamp").and_then(Value::as_str)
}


/// Get the model name, defaulting to `"unknown"`.
pub fn model(attributes: &Map<String, Value>) -> &str {
    attributes
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_MODEL)
}


/// Read a token-count attribute. Absent, `null`, or non-integer values
/// count as 0.
pub fn token_count(attributes: &Map<String, Value>, key: &str) -> i64 {
    attributes.get(key).and_then(Value::as_i64).unwrap_or(0)
}
