//! evidence-list-sources

use super::{string_params_schema, McpTool};
use crate::types::ToolError;
use evidence_db::QueryGateway;
use serde_json::Value;

pub struct ListSourcesTool;

impl McpTool for ListSourcesTool {
    fn name(&self) -> &'static str {
        "evidence-list-sources"
    }

    fn description(&self) -> &'static str {
        "List all Evidence data sources with their table names and directory paths."
    }

    fn input_schema(&self) -> Value {
        string_params_schema(&[])
    }

    fn execute(&self, _args: Value, gateway: &QueryGateway) -> Result<Value, ToolError> {
        Ok(serde_json::to_value(gateway.catalog().sources())?)
    }
}
