//! GraphQL-over-HTTP transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{Transport, TransportError};
use crate::operations::OperationDescriptor;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

pub struct GraphqlTransport {
    endpoint: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl GraphqlTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linear-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for GraphqlTransport {
    async fn execute(
        &self,
        operation: &'static OperationDescriptor,
        variables: Map<String, Value>,
    ) -> Result<Value, TransportError> {
        debug!(
            operation = operation.name,
            variables = ?variables.keys().collect::<Vec<_>>(),
            "sending GraphQL request"
        );

        let request = GraphqlRequest {
            query: operation.document,
            operation_name: operation.name,
            variables: &variables,
        };

        // Personal API keys are sent as-is, without a Bearer scheme.
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            // GraphQL servers often put the useful message in the body's errors array.
            let detail = serde_json::from_str::<GraphqlResponse>(&body)
                .ok()
                .and_then(|r| first_error_message(&r.errors))
                .unwrap_or(body);
            return Err(TransportError(format!(
                "{} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                detail
            )));
        }

        parse_response(&body)
    }
}

fn first_error_message(errors: &[GraphqlError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Extract `data` from a GraphQL response body, turning `errors` into a
/// transport failure.
pub(crate) fn parse_response(body: &str) -> Result<Value, TransportError> {
    let response: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| TransportError(format!("invalid GraphQL response: {}", e)))?;

    if let Some(message) = first_error_message(&response.errors) {
        return Err(TransportError(message));
    }

    match response.data {
        Some(Value::Object(data)) => Ok(Value::Object(data)),
        Some(_) | None => Err(TransportError(
            "GraphQL response carried no data".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_is_returned_verbatim() {
        let data = parse_response(r#"{"data":{"viewer":{"id":"u1"}}}"#).unwrap();
        assert_eq!(data, json!({ "viewer": { "id": "u1" } }));
    }

    #[test]
    fn graphql_errors_become_transport_errors() {
        let err = parse_response(
            r#"{"data":null,"errors":[{"message":"Entity not found"},{"message":"second"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.0, "Entity not found; second");
    }

    #[test]
    fn missing_data_is_a_protocol_error() {
        assert!(parse_response("{}").is_err());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn request_serializes_operation_name() {
        let variables = Map::new();
        let request = GraphqlRequest {
            query: "query Viewer { viewer { id } }",
            operation_name: "Viewer",
            variables: &variables,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["operationName"], "Viewer");
        assert_eq!(value["variables"], json!({}));
    }
}
