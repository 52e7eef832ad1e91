//! Result/error translation for backend calls.
//!
//! Every outbound call goes through [`translate`]:
//! - transport failure -> `LinearError::Transport` ("operation failed: ...")
//! - mutation answered with `success: false` -> `LinearError::Upstream`
//!   ("Failed to <action>")
//! - otherwise the operation's result field, unchanged

use serde_json::Value;
use tracing::warn;

use crate::error::{LinearError, LinearResult, TransportError};
use crate::operations::OperationDescriptor;

pub fn translate(
    operation: &OperationDescriptor,
    action: &str,
    response: Result<Value, TransportError>,
) -> LinearResult<Value> {
    let mut data = match response {
        Ok(data) => data,
        Err(e) => {
            warn!(operation = operation.name, error = %e, "backend call failed");
            return Err(LinearError::Transport(e));
        }
    };

    let result = data
        .get_mut(operation.result_field)
        .map(Value::take)
        .unwrap_or(Value::Null);

    if operation.shape.is_mutation() && !success_flag(&result) {
        warn!(operation = operation.name, action, "backend reported failure");
        return Err(LinearError::upstream(action));
    }

    Ok(result)
}

/// A mutation succeeded only if it says so; a missing flag is a failure.
fn success_flag(result: &Value) -> bool {
    result
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OperationId;
    use serde_json::json;

    #[test]
    fn transport_errors_echo_the_original_message() {
        let err = translate(
            OperationId::IssueCreate.descriptor(),
            "create issue",
            Err(TransportError::new("timed out")),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "operation failed: timed out");
    }

    #[test]
    fn unsuccessful_mutation_names_the_action() {
        let err = translate(
            OperationId::IssueUpdate.descriptor(),
            "update issue",
            Ok(json!({ "issueUpdate": { "success": false, "issue": null } })),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to update issue");
    }

    #[test]
    fn missing_result_field_counts_as_failure_for_mutations() {
        let err = translate(
            OperationId::IssueDelete.descriptor(),
            "delete issue",
            Ok(json!({})),
        )
        .unwrap_err();
        assert!(matches!(err, LinearError::Upstream { .. }));
    }

    #[test]
    fn successful_result_is_passed_through_unchanged() {
        let payload = json!({ "success": true, "issue": { "id": "i1", "extra": [1, 2] } });
        let out = translate(
            OperationId::IssueCreate.descriptor(),
            "create issue",
            Ok(json!({ "issueCreate": payload.clone() })),
        )
        .unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn queries_have_no_success_flag() {
        let out = translate(
            OperationId::Viewer.descriptor(),
            "get viewer",
            Ok(json!({ "viewer": { "id": "u1" } })),
        )
        .unwrap();
        assert_eq!(out, json!({ "id": "u1" }));
    }
}
