//! JSON output for mpath values.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`]
//! - **Pretty output** via [`to_json_pretty()`] - 2-space indentation
//! - **Exact numbers** - decimals are written with the digits they hold, never
//!   through a binary float
//! - **Deterministic** - object keys are always sorted
//!
//! Whether numbers are written bare (`1.50`) or quoted (`"1.50"`) is a
//! process-wide setting, see [`set_quote_decimals()`].
//!
//! # Examples
//!
//! ```
//! use mpath::Value;
//! use mpath::output::{to_json, to_json_pretty};
//!
//! let value = Value::from(42);
//!
//! assert_eq!(to_json(&value), "42");
//! assert_eq!(to_json_pretty(&value), "42");
//! ```

use std::{
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::value::Value;

static QUOTE_DECIMALS: AtomicBool = AtomicBool::new(false);

/// Sets whether decimals serialize as JSON strings. Affects the whole process.
pub fn set_quote_decimals(quoted: bool) {
    QUOTE_DECIMALS.store(quoted, Ordering::Relaxed);
}

pub fn quote_decimals() -> bool {
    QUOTE_DECIMALS.load(Ordering::Relaxed)
}

/// Converts a value to a `serde_json::Value`, honouring the quoting setting.
pub fn to_json_value(value: &Value) -> serde_json::Value {
    json_value(value, quote_decimals())
}

fn json_value(value: &Value, quoted: bool) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            let text = n.to_string();
            if quoted {
                return serde_json::Value::String(text);
            }
            serde_json::Number::from_str(&text)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::String(text))
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Record(record) => serde_json::Value::Object(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), json_value(v, quoted)))
                .collect(),
        ),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), json_value(v, quoted)))
                .collect(),
        ),
        Value::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(|v| json_value(v, quoted)).collect())
        }
    }
}

/// Converts a Value to compact JSON.
///
/// # Examples
///
/// ```
/// use mpath::{Record, Value};
/// use mpath::output::to_json;
///
/// let record = Record::new().with("name", "Alice").with("age", 30);
///
/// assert_eq!(to_json(&Value::Record(record)), r#"{"age":30,"name":"Alice"}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    to_json_value(value).to_string()
}

/// Converts a Value to pretty-printed JSON with 2-space indentation.
///
/// # Examples
///
/// ```
/// use mpath::{Record, Value};
/// use mpath::output::to_json_pretty;
///
/// let record = Record::new().with("name", "Alice");
///
/// assert_eq!(to_json_pretty(&Value::Record(record)), "{\n  \"name\": \"Alice\"\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    let json = to_json_value(value);
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
}
