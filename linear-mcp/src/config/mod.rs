//! Configuration for the Linear MCP server
//!
//! Values come from an optional TOML file and are then overridden by CLI flags
//! and environment variables in the binary.

pub mod types;

pub use types::*;
