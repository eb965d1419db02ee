//! MCP Tool Implementations
//!
//! Each tool exposes one read-only operation over the catalog. Tools are
//! registered in the ToolRegistry and dispatched by name.
//!
//! - `evidence-list-sources`: sources with their tables and paths
//! - `evidence-list-tables`: table names of one source
//! - `evidence-describe-table`: schema sidecar fields of one table
//! - `evidence-query`: SQL over every table, registered as `"{source}_{table}"`

mod registry;

mod describe;
mod query;
mod sources;
mod tables;

pub use registry::ToolRegistry;

use crate::protocol::ToolDefinition;
use crate::types::ToolError;
use evidence_db::QueryGateway;
use serde_json::Value;

/// Trait for MCP tools
///
/// Execution is synchronous; the server handles one call at a time.
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "evidence-query")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    fn execute(&self, args: Value, gateway: &QueryGateway) -> Result<Value, ToolError>;

    /// Get the tool definition for tools/list
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

// Macro to reduce boilerplate for tool parameter extraction
macro_rules! require_param {
    ($args:expr, $name:literal, $ty:ty) => {
        match $args.get($name) {
            None | Some(serde_json::Value::Null) => {
                return Err($crate::types::ToolError::InvalidParams(format!(
                    "Missing required parameter: {}",
                    $name
                )))
            }
            Some(value) => serde_json::from_value::<$ty>(value.clone()).map_err(|e| {
                $crate::types::ToolError::InvalidParams(format!(
                    "Invalid parameter '{}': {}",
                    $name, e
                ))
            })?,
        }
    };
}

pub(crate) use require_param;

/// `{"type": "object", ...}` schema with string properties, all required.
fn string_params_schema(params: &[(&str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = params
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                serde_json::json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    let required: Vec<&str> = params.iter().map(|(name, _)| *name).collect();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
