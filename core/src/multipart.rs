//! Form fields for upload requests.
//!
//! Form parameters are flattened with bracket notation (`a[b]`, `c[0]`), the
//! convention web frameworks use to rebuild nested structures from forms.
//! The wire encoding itself is left to the HTTP client.

use serde_json::Value;

use crate::error::{Result, TesterError};

/// Text fields of an upload form, in parameter order.
///
/// `parameters` must be a JSON object (or null / absent).
pub fn form_fields(parameters: Option<&Value>) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::new();
    match parameters {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => {
            for (key, value) in map {
                flatten(key.clone(), value, &mut fields);
            }
        }
        Some(other) => {
            return Err(TesterError::Multipart(format!(
                "form parameters must be an object, got {other}"
            )))
        }
    }
    Ok(fields)
}

/// Flatten a JSON value into `(name, value)` form fields.
pub fn flatten(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(format!("{prefix}[{key}]"), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(format!("{prefix}[{index}]"), child, out);
            }
        }
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Null => out.push((prefix, String::new())),
        Value::Number(n) => out.push((prefix, n.to_string())),
    }
}
