//! Required-field and shape validation for caller arguments.
//!
//! These checks run before any backend call. A missing required field, or a
//! field whose runtime type does not match its declared shape, ends the
//! invocation with `LinearError::Validation`.

use serde_json::{Map, Value};

use crate::error::{LinearError, LinearResult};

pub type Args = Map<String, Value>;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(field: &str, expected: &str, got: &Value) -> LinearError {
    LinearError::validation(format!(
        "'{}' must be {}, got {}",
        field,
        expected,
        type_name(got)
    ))
}

/// Tool arguments must be a JSON object; `null` is read as `{}`.
pub fn into_object(value: Value) -> LinearResult<Args> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(mismatch("arguments", "an object", &other)),
    }
}

pub fn require_str(args: &Args, field: &str) -> LinearResult<String> {
    match args.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(LinearError::validation(format!(
            "'{}' must not be empty",
            field
        ))),
        None | Some(Value::Null) => Err(LinearError::validation(format!(
            "missing required field '{}'",
            field
        ))),
        Some(other) => Err(mismatch(field, "a string", other)),
    }
}

pub fn optional_str(args: &Args, field: &str) -> LinearResult<Option<String>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, "a string", other)),
    }
}

fn string_items(field: &str, items: &[Value]) -> LinearResult<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch(&format!("{}[]", field), "a string", other)),
        })
        .collect()
}

pub fn optional_string_list(args: &Args, field: &str) -> LinearResult<Option<Vec<String>>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => string_items(field, items).map(Some),
        Some(other) => Err(mismatch(field, "an array of strings", other)),
    }
}

/// A required, non-empty list of strings.
pub fn require_string_list(args: &Args, field: &str) -> LinearResult<Vec<String>> {
    match optional_string_list(args, field)? {
        Some(items) if !items.is_empty() => Ok(items),
        Some(_) => Err(LinearError::validation(format!(
            "'{}' must contain at least one entry",
            field
        ))),
        None => Err(LinearError::validation(format!(
            "missing required field '{}'",
            field
        ))),
    }
}

pub fn require_object(args: &Args, field: &str) -> LinearResult<Args> {
    match args.get(field) {
        Some(Value::Object(map)) => Ok(map.clone()),
        None | Some(Value::Null) => Err(LinearError::validation(format!(
            "missing required field '{}'",
            field
        ))),
        Some(other) => Err(mismatch(field, "an object", other)),
    }
}

/// A required list of objects. An empty list is accepted.
pub fn require_object_list(args: &Args, field: &str) -> LinearResult<Vec<Args>> {
    match args.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map.clone()),
                other => Err(mismatch(&format!("{}[]", field), "an object", other)),
            })
            .collect(),
        None | Some(Value::Null) => Err(LinearError::validation(format!(
            "missing required field '{}'",
            field
        ))),
        Some(other) => Err(mismatch(field, "an array", other)),
    }
}

pub fn optional_u32(args: &Args, field: &str) -> LinearResult<Option<u32>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .map(Some)
            .ok_or_else(|| {
                LinearError::validation(format!("'{}' must be a positive integer", field))
            }),
        Some(other) => Err(mismatch(field, "a positive integer", other)),
    }
}

/// Identifiers given either as `id` (one) or `ids` (a list).
pub fn require_ids(args: &Args) -> LinearResult<Vec<String>> {
    match (args.get("id"), args.get("ids")) {
        (Some(id), _) if !id.is_null() => Ok(vec![require_str(args, "id")?]),
        _ => require_string_list(args, "ids"),
    }
}
