//! evidence-describe-table

use super::{require_param, string_params_schema, McpTool};
use crate::types::ToolError;
use evidence_db::QueryGateway;
use serde_json::Value;

pub struct DescribeTableTool;

impl McpTool for DescribeTableTool {
    fn name(&self) -> &'static str {
        "evidence-describe-table"
    }

    fn description(&self) -> &'static str {
        "Describe the columns of a table as recorded in its schema file. \
         Returns an empty list when the table has no schema file."
    }

    fn input_schema(&self) -> Value {
        string_params_schema(&[("source", "Source name"), ("table", "Table name")])
    }

    fn execute(&self, args: Value, gateway: &QueryGateway) -> Result<Value, ToolError> {
        let source = require_param!(args, "source", String);
        let table = require_param!(args, "table", String);
        let fields = gateway.describe_table(&source, &table)?;
        Ok(serde_json::to_value(fields)?)
    }
}
