//! Scalar repair for create/update payloads.
//!
//! Two fields are coerced rather than validated:
//! - `estimate`: coerced to an integer, dropped when coercion fails
//! - `priority`: coerced to an integer in `[0, 4]`, otherwise reset to `0`
//!
//! An explicit `null` counts as absent and removes the field. Every other
//! field passes through unchanged, and nothing here rejects a request.

use serde_json::{Map, Value};
use tracing::debug;

pub const PRIORITY_MIN: i64 = 0;
pub const PRIORITY_MAX: i64 = 4;
pub const DEFAULT_PRIORITY: i64 = 0;

/// Coerce a JSON value to an integer. Floats truncate toward zero; strings are
/// trimmed and parsed as an integer, then as a float.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_float))
        }
        _ => None,
    }
}

fn truncate_float(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

pub fn normalize_payload(mut payload: Map<String, Value>) -> Map<String, Value> {
    match payload.remove("estimate") {
        None | Some(Value::Null) => {}
        Some(raw) => match coerce_integer(&raw) {
            Some(estimate) => {
                payload.insert("estimate".to_string(), Value::from(estimate));
            }
            None => debug!(estimate = %raw, "dropping estimate that is not a number"),
        },
    }

    match payload.remove("priority") {
        None | Some(Value::Null) => {}
        Some(raw) => {
            let priority = coerce_integer(&raw)
                .filter(|p| (PRIORITY_MIN..=PRIORITY_MAX).contains(p))
                .unwrap_or_else(|| {
                    debug!(priority = %raw, "priority out of range, using default");
                    DEFAULT_PRIORITY
                });
            payload.insert("priority".to_string(), Value::from(priority));
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(normalize_payload(map)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unparseable_estimate_is_dropped() {
        let out = normalize(json!({ "title": "t", "estimate": "abc" }));
        assert_eq!(out, json!({ "title": "t" }));
    }

    #[test]
    fn numeric_string_estimate_becomes_integer() {
        let out = normalize(json!({ "estimate": "3" }));
        assert_eq!(out["estimate"], json!(3));
        assert!(out["estimate"].is_i64());
    }

    #[test]
    fn float_estimate_truncates() {
        assert_eq!(normalize(json!({ "estimate": 2.9 }))["estimate"], json!(2));
        assert_eq!(normalize(json!({ "estimate": " 5.5 " }))["estimate"], json!(5));
    }

    #[test]
    fn out_of_range_or_invalid_priority_resets_to_zero() {
        for raw in [json!(-1), json!(7), json!("xyz"), json!(true), json!([1])] {
            let out = normalize(json!({ "priority": raw }));
            assert_eq!(out["priority"], json!(0), "for input {}", raw);
        }
    }

    #[test]
    fn explicit_zero_priority_is_kept() {
        let out = normalize(json!({ "priority": 0 }));
        assert_eq!(out, json!({ "priority": 0 }));
    }

    #[test]
    fn valid_priority_passes_through_as_integer() {
        assert_eq!(normalize(json!({ "priority": "2" }))["priority"], json!(2));
        assert_eq!(normalize(json!({ "priority": 4 }))["priority"], json!(4));
    }

    #[test]
    fn null_fields_are_treated_as_absent() {
        let out = normalize(json!({ "estimate": null, "priority": null, "title": "t" }));
        assert_eq!(out, json!({ "title": "t" }));
    }

    #[test]
    fn other_fields_are_untouched() {
        let input = json!({ "title": "t", "labelIds": ["l1"], "dueDate": "2026-01-01" });
        assert_eq!(normalize(input.clone()), input);
    }
}
