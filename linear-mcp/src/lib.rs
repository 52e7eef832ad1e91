//! Linear issue tracking exposed as MCP tools.
//!
//! Tool calls are validated and turned into typed intents, routed through a
//! static table of GraphQL operations, executed over an authenticated
//! transport and translated back into plain JSON results.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod mcp;
pub mod operations;
pub mod tools;
pub mod transport;

pub use error::{LinearError, LinearResult};
pub use tools::LinearTools;
