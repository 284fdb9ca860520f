//! JSON text <-> mpath Value conversion

use crate::{
    Value,
    output::{to_json, to_json_pretty},
};

use super::CliError;

/// Parse JSON text into a Value, keeping numbers exact
pub fn parse_input(text: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from_json(json)?)
}

/// Render a Value as JSON text
pub fn render(value: &Value, pretty: bool) -> String {
    if pretty {
        to_json_pretty(value)
    } else {
        to_json(value)
    }
}
