//! Linear MCP Server
//!
//! Exposes Linear issue tracking as MCP tools over stdio.
//!
//! Usage:
//!   LINEAR_API_KEY=lin_api_... linear-mcp
//!   linear-mcp --config linear-mcp.toml --verbose
//!
//! stdout carries the JSON-RPC stream; all logging goes to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use linear_mcp::auth::ApiKeySession;
use linear_mcp::config::LinearConfig;
use linear_mcp::mcp::{register_linear_tools, MCPServer};
use linear_mcp::tools::LinearTools;

#[derive(Parser, Debug)]
#[command(version, about = "Linear MCP Server - Exposes Linear as MCP tools", author)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "LINEAR_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Linear API key; overrides the config file
    #[arg(long, env = "LINEAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// GraphQL endpoint; overrides the config file
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<LinearConfig> {
        let mut config = match &self.config {
            Some(path) => LinearConfig::load(path)?,
            None => LinearConfig::default(),
        };

        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("linear_mcp={}", level).parse()?),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = args.load_config()?;
    info!(endpoint = %config.endpoint, "starting Linear MCP server");
    if config.resolve_api_key().is_none() {
        warn!(
            env = %config.api_key_env,
            "no API key configured; every tool call will fail authentication"
        );
    }

    let sessions = Arc::new(ApiKeySession::from_config(&config));
    let tools = Arc::new(LinearTools::new(sessions, config.default_page_size));

    let mut server = MCPServer::new(&config.server_name, env!("CARGO_PKG_VERSION"));
    register_linear_tools(&mut server, tools);
    info!(tools = server.tool_count(), "tools registered");

    server.run_stdio().await?;
    info!("stdin closed, shutting down");
    Ok(())
}
