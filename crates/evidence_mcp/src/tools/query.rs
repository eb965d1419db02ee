//! evidence-query
//!
//! Runs caller SQL in a fresh session where every table is a view named
//! `"{source}_{table}"`. Names can contain spaces, so views must be quoted.

use super::{require_param, string_params_schema, McpTool};
use crate::types::ToolError;
use evidence_db::QueryGateway;
use serde_json::Value;
use tracing::info;

pub struct QueryTool;

impl McpTool for QueryTool {
    fn name(&self) -> &'static str {
        "evidence-query"
    }

    fn description(&self) -> &'static str {
        "Run a read-only SQL query (DuckDB dialect). Every table is available as a \
         view named \"<source>_<table>\"; always double-quote the view name, e.g. \
         SELECT * FROM \"sales_orders\" LIMIT 10."
    }

    fn input_schema(&self) -> Value {
        string_params_schema(&[("query", "SQL query to execute")])
    }

    fn execute(&self, args: Value, gateway: &QueryGateway) -> Result<Value, ToolError> {
        let sql = require_param!(args, "query", String);
        if sql.trim().is_empty() {
            return Err(ToolError::InvalidParams("query must not be empty".to_string()));
        }

        let result = gateway.run_query(&sql)?;
        info!(rows = result.row_count(), "Query completed");

        Ok(Value::Array(
            result.to_records().into_iter().map(Value::Object).collect(),
        ))
    }
}
