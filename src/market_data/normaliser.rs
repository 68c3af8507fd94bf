// Convert the exchange's loosely-typed JSON fields into plain numbers/strings.
// Every function here is total: schema drift upstream degrades to 0 / None,
// never to an error.

use serde_json::Value;

/// Coerce any upstream value into a finite `f64`.
///
/// Numbers pass through, strings have `,` grouping separators stripped before
/// parsing, and everything else (null, bools, objects, garbage text,
/// `"NaN"`/`"inf"`) yields `0.0`.
pub fn sanitize_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

pub fn sanitize_opt(value: Option<&Value>) -> f64 {
    value.map(sanitize_number).unwrap_or(0.0)
}

// A value "counts" for alias resolution unless it is missing, null, an empty
// string, zero or false.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// First present value among `sources`, tried in order.
pub fn pick<'a>(record: &'a Value, sources: &[&str]) -> Option<&'a Value> {
    sources
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| is_present(v))
}

pub fn number_field(record: &Value, sources: &[&str]) -> f64 {
    sanitize_opt(pick(record, sources))
}

/// String form of the first present source; numeric ids are stringified.
pub fn text_field(record: &Value, sources: &[&str]) -> Option<String> {
    pick(record, sources).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The list of records in a response body: either the body itself when it is
/// an array, or the first envelope key holding an array.
pub fn records<'a>(body: &'a Value, envelopes: &[&str]) -> Option<&'a [Value]> {
    if let Value::Array(items) = body {
        return Some(items.as_slice());
    }
    envelopes
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_array().map(|a| a.as_slice()))
}

/// Round to 4 decimal places.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
