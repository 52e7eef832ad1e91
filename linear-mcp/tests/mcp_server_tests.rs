mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{tools_with, MockTransport};
use linear_mcp::mcp::{register_linear_tools, MCPServer};

fn server_with(transport: Arc<MockTransport>) -> MCPServer {
    let mut server = MCPServer::new("linear-mcp", "test");
    register_linear_tools(&mut server, Arc::new(tools_with(transport)));
    server
}

async fn exchange(server: &MCPServer, requests: &[Value]) -> Vec<Value> {
    let input = requests
        .iter()
        .map(|r| format!("{}\n", r))
        .collect::<String>();
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn lists_every_linear_tool() {
    let server = server_with(MockTransport::new());

    let responses = exchange(
        &server,
        &[json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" })],
    )
    .await;

    let names: Vec<&str> = responses[0]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(server.tool_count(), 15);
    assert_eq!(names.len(), 15);
    assert!(names.iter().all(|name| name.starts_with("linear_")));
    assert!(names.contains(&"linear_create_project_with_issues"));
}

#[tokio::test]
async fn handshake_then_tool_call() {
    let transport = MockTransport::new();
    transport.respond(
        "Viewer",
        json!({ "viewer": { "id": "u1", "name": "Ada", "email": "ada@example.com" } }),
    );
    let server = server_with(transport.clone());

    let responses = exchange(
        &server,
        &[
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": { "name": "linear_get_viewer", "arguments": {} }
            }),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], json!("linear-mcp"));
    assert_eq!(responses[1]["id"], json!(2));

    let text = responses[1]["result"]["content"][0]["text"].as_str().unwrap();
    let viewer: Value = serde_json::from_str(text).unwrap();
    assert_eq!(viewer["name"], json!("Ada"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn invalid_arguments_map_to_invalid_params() {
    let transport = MockTransport::new();
    let server = server_with(transport.clone());

    let responses = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "linear_create_issue", "arguments": { "teamId": "t" } }
        })],
    )
    .await;

    assert_eq!(responses[0]["error"]["code"], json!(-32602));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn backend_failures_map_to_internal_error() {
    let transport = MockTransport::new();
    transport.fail("TeamList", "503 Service Unavailable: maintenance");
    let server = server_with(transport);

    let responses = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "tools/call",
            "params": { "name": "linear_get_teams" }
        })],
    )
    .await;

    assert_eq!(responses[0]["id"], json!("abc"));
    assert_eq!(responses[0]["error"]["code"], json!(-32603));
    assert_eq!(
        responses[0]["error"]["message"],
        json!("operation failed: 503 Service Unavailable: maintenance")
    );
}

#[tokio::test]
async fn unknown_tools_are_rejected() {
    let server = server_with(MockTransport::new());

    let responses = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "linear_archive_everything", "arguments": {} }
        })],
    )
    .await;

    assert_eq!(responses[0]["error"]["code"], json!(-32602));
    assert_eq!(
        responses[0]["error"]["message"],
        json!("Invalid arguments: Unknown tool: linear_archive_everything")
    );
}
