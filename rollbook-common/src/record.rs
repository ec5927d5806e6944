//! Records and property paths.
//!
//! A record is a JSON object as returned by the REST API. Descriptors address
//! values inside it with dotted paths (`"student.fullName"`, `"images.0"`).

use serde_json::Value;

/// A single row as delivered by a query collaborator.
pub type Record = Value;

/// Resolve a dotted property path on a record.
///
/// Object segments look up keys, numeric segments index arrays. An empty path
/// returns the record itself. Returns `None` when any segment is missing.
pub fn value_at<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(record);
    }
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Render a value the way a plain text cell shows it.
///
/// Null renders as an empty string; strings render without quotes; arrays and
/// objects render as compact JSON.
pub fn display_raw(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Compare two values, treating a number and its string form as equal.
///
/// Option ids come back from the API as numbers while form values are often
/// strings (`5` vs `"5"`).
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            display_raw(a) == display_raw(b)
        }
        _ => false,
    }
}
