//! Evidence MCP Server
//!
//! Exposes the data of an Evidence project to MCP clients over stdio:
//! four read-only tools and three resource shapes, all backed by
//! [`evidence_db::QueryGateway`].
//!
//! # Tools
//!
//! - `evidence-list-sources`
//! - `evidence-list-tables`
//! - `evidence-describe-table`
//! - `evidence-query`
//!
//! # Resources
//!
//! - `evidence://{source}`
//! - `evidence://query/{source}/{table}`
//! - `evidence://sql/{query}`

pub mod protocol;
pub mod resources;
pub mod security;
pub mod server;
pub mod tools;
pub mod types;

pub use server::{McpServer, McpServerConfig, SERVER_NAME};
pub use types::ToolError;
