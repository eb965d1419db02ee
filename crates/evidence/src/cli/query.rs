//! `query`: run one SQL statement from the command line.

use anyhow::Result;
use evidence_db::{QueryError, QueryResult};
use serde_json::Value;

use super::error::HelpfulError;
use super::output::{cell_text, print_json, print_table};
use super::{open_gateway, ProjectArgs};

pub fn run(project: &ProjectArgs, sql: &str, json: bool) -> Result<()> {
    let gateway = open_gateway(project)?;

    let result = gateway.run_query(sql).map_err(|err| match err {
        QueryError::Execution(message) => {
            anyhow::Error::from(HelpfulError::query_failed(message))
        }
        other => anyhow::Error::from(other),
    })?;

    if json {
        let records = result.to_records().into_iter().map(Value::Object).collect();
        return print_json(&Value::Array(records));
    }

    let headers: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    print_table(&headers, text_rows(&result));
    println!("({} rows)", result.row_count());
    Ok(())
}

fn text_rows(result: &QueryResult) -> Vec<Vec<String>> {
    result
        .rows
        .iter()
        .map(|row| row.to_json_array().iter().map(cell_text).collect())
        .collect()
}
