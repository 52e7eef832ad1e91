//! MCP Server Implementation
//!
//! JSON-RPC 2.0 over newline-delimited stdio. Each line is one request;
//! each request with an id gets exactly one response line. Notifications
//! (no id) are processed and never answered.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::{LinearError, LinearResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Type alias for async tool handler functions
pub type ToolHandler =
    Box<dyn Fn(Value) -> Pin<Box<dyn Future<Output = LinearResult<Value>> + Send>> + Send + Sync>;

/// MCP JSON-RPC Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// MCP JSON-RPC Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message,
                data: None,
            }),
        }
    }
}

/// MCP JSON-RPC Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tool definition for MCP
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

enum MethodError {
    NotFound(String),
    Tool(LinearError),
}

impl MethodError {
    fn code(&self) -> i32 {
        match self {
            MethodError::NotFound(_) => METHOD_NOT_FOUND,
            MethodError::Tool(e) if e.is_validation() => INVALID_PARAMS,
            MethodError::Tool(_) => INTERNAL_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            MethodError::NotFound(message) => message.clone(),
            MethodError::Tool(e) => e.to_string(),
        }
    }
}

impl From<LinearError> for MethodError {
    fn from(e: LinearError) -> Self {
        MethodError::Tool(e)
    }
}

/// MCP Server
pub struct MCPServer {
    name: String,
    version: String,
    tools: BTreeMap<String, (ToolDefinition, Arc<ToolHandler>)>,
}

impl MCPServer {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            tools: BTreeMap::new(),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Get all tool definitions, ordered by name
    pub fn get_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().map(|(def, _)| def).collect()
    }

    /// Call a tool by name with arguments
    pub async fn call_tool(&self, name: &str, arguments: Value) -> LinearResult<Value> {
        let (_, handler) = self
            .tools
            .get(name)
            .ok_or_else(|| LinearError::validation(format!("Unknown tool: {}", name)))?;

        handler(arguments).await
    }

    /// Register a tool with its handler
    pub fn register_tool(
        &mut self,
        name: &str,
        description: &str,
        input_schema: Value,
        handler: ToolHandler,
    ) {
        let definition = ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        };
        self.tools
            .insert(name.to_string(), (definition, Arc::new(handler)));
    }

    /// Run the MCP server over stdio
    pub async fn run_stdio(&self) -> LinearResult<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        info!(server = %self.name, tools = self.tool_count(), "listening on stdio");
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC until the reader reaches EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> LinearResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                debug!("client closed the connection");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<MCPRequest>(trimmed) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!(error = %e, "unparseable request");
                    Some(MCPResponse::failure(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single MCP request. Notifications yield no response.
    pub async fn handle_request(&self, request: MCPRequest) -> Option<MCPResponse> {
        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&request.params)),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "ping" => Ok(json!({})),
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(MethodError::NotFound(format!(
                "Method not found: {}",
                method
            ))),
        };

        // Notifications carry no id and get no reply, even on failure.
        let id = request.id?;

        Some(match result {
            Ok(result) => MCPResponse::success(Some(id), result),
            Err(e) => MCPResponse::failure(Some(id), e.code(), e.message()),
        })
    }

    fn handle_initialize(&self, _params: &Value) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.name,
                "version": self.version
            }
        })
    }

    fn handle_tools_list(&self) -> Value {
        json!({
            "tools": self.get_tools()
        })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, MethodError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LinearError::validation("Missing tool name"))?;

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        debug!(tool = tool_name, "tool call");
        let result = self.call_tool(tool_name, arguments).await.map_err(|e| {
            warn!(tool = tool_name, error = %e, "tool call failed");
            e
        })?;

        let text = serde_json::to_string_pretty(&result).map_err(LinearError::from)?;
        Ok(json!({
            "content": [{
                "type": "text",
                "text": text
            }]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_server() -> MCPServer {
        let mut server = MCPServer::new("test", "0.0.0");
        server.register_tool(
            "echo",
            "Echo the arguments back",
            json!({ "type": "object" }),
            Box::new(|args| Box::pin(async move { Ok(args) })),
        );
        server.register_tool(
            "reject",
            "Always fails validation",
            json!({ "type": "object" }),
            Box::new(|_| Box::pin(async move { Err(LinearError::validation("bad input")) })),
        );
        server
    }

    fn request(id: Option<Value>, method: &str, params: Value) -> MCPRequest {
        MCPRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let response = echo_server()
            .handle_request(request(Some(json!(1)), "initialize", json!({})))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "test");
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let response = echo_server()
            .handle_request(request(None, "notifications/initialized", json!({})))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let response = echo_server()
            .handle_request(request(Some(json!(2)), "resources/list", json!({})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tool_results_are_wrapped_as_text_content() {
        let response = echo_server()
            .handle_request(request(
                Some(json!(3)),
                "tools/call",
                json!({ "name": "echo", "arguments": { "a": 1 } }),
            ))
            .await
            .unwrap();
        let text = response.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn validation_failures_are_invalid_params() {
        let response = echo_server()
            .handle_request(request(
                Some(json!(4)),
                "tools/call",
                json!({ "name": "reject", "arguments": {} }),
            ))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Invalid arguments: bad input");
    }

    #[tokio::test]
    async fn serve_answers_each_request_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();
        echo_server()
            .serve(input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"]["tools"][0]["name"], "echo");
        assert_eq!(lines[1]["error"]["code"], PARSE_ERROR);
    }
}
