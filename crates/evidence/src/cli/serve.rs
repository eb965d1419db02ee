//! MCP Server CLI launcher
//!
//! The server communicates via stdio using JSON-RPC. Nothing but protocol
//! messages may be written to stdout.

use anyhow::Result;
use evidence_mcp::{McpServer, McpServerConfig};

use super::{open_gateway, ProjectArgs};

/// Arguments for the serve command
#[derive(Debug, Clone)]
pub struct ServeArgs {
    pub default_result_limit: usize,
    pub max_response_bytes: usize,
}

/// Run the MCP server until stdin closes
pub fn run(project: &ProjectArgs, args: ServeArgs) -> Result<()> {
    let gateway = open_gateway(project)?;

    let config = McpServerConfig {
        default_result_limit: args.default_result_limit,
        max_response_bytes: args.max_response_bytes,
        ..McpServerConfig::default()
    };

    tracing::info!(
        tables = gateway.catalog().table_count(),
        "MCP Server starting via stdio"
    );

    let mut server = McpServer::new(gateway, config);
    server.run()
}
