//! Human-facing rendering of API results.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Text for an HTTP status, given the code that means success for the call.
pub fn status_text(status: u16, success: u16) -> String {
    if status == success {
        return "Success".to_string();
    }
    match status {
        401 => "Unauthorized".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Not Found".to_string(),
        422 => "Unprocessable".to_string(),
        other => reqwest::StatusCode::from_u16(other)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", other)),
    }
}

/// Pretty-print JSON with sorted keys and four-space indentation.
pub fn pretty_json(value: &Value) -> Result<String, String> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sort_keys(value)
        .serialize(&mut ser)
        .map_err(|e| format!("JSON serialize error: {}", e))?;
    String::from_utf8(buf).map_err(|e| format!("JSON output is not UTF-8: {}", e))
}

// Map order follows insertion when serde_json's `preserve_order` is on.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
