//! evidence-list-tables

use super::{require_param, string_params_schema, McpTool};
use crate::types::ToolError;
use evidence_db::QueryGateway;
use serde_json::Value;

pub struct ListTablesTool;

impl McpTool for ListTablesTool {
    fn name(&self) -> &'static str {
        "evidence-list-tables"
    }

    fn description(&self) -> &'static str {
        "List the tables of one Evidence data source."
    }

    fn input_schema(&self) -> Value {
        string_params_schema(&[("source", "Source name")])
    }

    fn execute(&self, args: Value, gateway: &QueryGateway) -> Result<Value, ToolError> {
        let source = require_param!(args, "source", String);
        let tables = gateway.catalog().source_tables(&source)?;
        Ok(serde_json::to_value(tables)?)
    }
}
