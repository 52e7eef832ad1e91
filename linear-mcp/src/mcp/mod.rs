//! MCP (Model Context Protocol) surface
//!
//! A stdio JSON-RPC server and the catalog of `linear_*` tools it exposes.

pub mod catalog;
pub mod server;

pub use catalog::register_linear_tools;
pub use server::{MCPError, MCPRequest, MCPResponse, MCPServer, ToolDefinition, ToolHandler};
