//! Resource addressing
//!
//! Three URI shapes are served:
//!
//! - `evidence://{source}`: the source with its tables and path
//! - `evidence://query/{source}/{table}`: the first rows of one table
//! - `evidence://sql/{query}`: a percent-encoded SQL query
//!
//! Failures are returned as `text/plain` contents, never as protocol errors.

use evidence_db::QueryGateway;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::protocol::{ResourceContents, ResourceDefinition, ResourceTemplate};

pub const URI_SCHEME: &str = "evidence://";
pub const MIME_JSON: &str = "application/json";
pub const MIME_TEXT: &str = "text/plain";

const QUERY_PREFIX: &str = "query/";
const SQL_PREFIX: &str = "sql/";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Source(String),
    Table { source: String, table: String },
    Sql(String),
}

impl ResourceUri {
    /// Parse a URI; `None` for anything outside the three shapes.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(URI_SCHEME)?;

        if let Some(path) = rest.strip_prefix(QUERY_PREFIX) {
            let (source, table) = path.split_once('/')?;
            if source.is_empty() || table.is_empty() || table.contains('/') {
                return None;
            }
            return Some(ResourceUri::Table {
                source: decode(source)?,
                table: decode(table)?,
            });
        }

        if let Some(encoded) = rest.strip_prefix(SQL_PREFIX) {
            if encoded.is_empty() {
                return None;
            }
            return decode(encoded).map(ResourceUri::Sql);
        }

        if rest.is_empty() || rest.contains('/') {
            return None;
        }
        decode(rest).map(ResourceUri::Source)
    }
}

fn decode(component: &str) -> Option<String> {
    urlencoding::decode(component).ok().map(|s| s.into_owned())
}

/// Canonical URI of a source resource.
pub fn source_uri(source: &str) -> String {
    format!("{}{}", URI_SCHEME, urlencoding::encode(source))
}

/// One resource per cataloged source.
pub fn list_resources(gateway: &QueryGateway) -> Vec<ResourceDefinition> {
    gateway
        .catalog()
        .sources()
        .into_iter()
        .map(|source| ResourceDefinition {
            uri: source_uri(&source.name),
            name: format!("evidence-{}", source.name),
            description: Some(format!(
                "Evidence source '{}' ({} tables)",
                source.name,
                source.tables.len()
            )),
            mime_type: Some(MIME_JSON.to_string()),
        })
        .collect()
}

/// The table and SQL templates.
pub fn list_templates() -> Vec<ResourceTemplate> {
    vec![
        ResourceTemplate {
            uri_template: format!("{}{}{{source}}/{{table}}", URI_SCHEME, QUERY_PREFIX),
            name: "evidence-table".to_string(),
            description: Some("First rows of one table".to_string()),
            mime_type: Some(MIME_JSON.to_string()),
        },
        ResourceTemplate {
            uri_template: format!("{}{}{{query}}", URI_SCHEME, SQL_PREFIX),
            name: "evidence-sql".to_string(),
            description: Some("Result of a percent-encoded SQL query".to_string()),
            mime_type: Some(MIME_JSON.to_string()),
        },
    ]
}

/// Resolve `uri` into a single contents item.
pub fn read_resource(gateway: &QueryGateway, uri: &str, preview_limit: usize) -> ResourceContents {
    let Some(parsed) = ResourceUri::parse(uri) else {
        warn!(uri, "Unrecognized resource URI");
        return text(uri, format!("Unrecognized resource URI: {}", uri));
    };

    match parsed {
        ResourceUri::Source(name) => match gateway.catalog().source_tables(&name) {
            Ok(tables) => {
                let path = gateway
                    .catalog()
                    .source(&name)
                    .map(|s| s.path.display().to_string())
                    .unwrap_or_default();
                json(
                    uri,
                    &serde_json::json!({ "source": name, "tables": tables, "path": path }),
                )
            }
            Err(err) => text(uri, format!("Error reading source: {}", bare(&err))),
        },
        ResourceUri::Table { source, table } => {
            match gateway.preview_table(&source, &table, preview_limit) {
                Ok(result) => json(uri, &records(result.to_records())),
                Err(err) => text(uri, format!("Error querying table: {}", query_message(&err))),
            }
        }
        ResourceUri::Sql(sql) => match gateway.run_query(&sql) {
            Ok(result) => json(uri, &records(result.to_records())),
            Err(err) => text(
                uri,
                format!("Error executing SQL query: {}", query_message(&err)),
            ),
        },
    }
}

fn records(rows: Vec<serde_json::Map<String, Value>>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

fn bare(err: &evidence_catalog::CatalogError) -> String {
    match err {
        evidence_catalog::CatalogError::NotFound(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn query_message(err: &evidence_db::QueryError) -> String {
    match err {
        evidence_db::QueryError::NotFound(inner) => bare(inner),
        other => other.to_string(),
    }
}

fn json<T: Serialize>(uri: &str, value: &T) -> ResourceContents {
    match serde_json::to_string_pretty(value) {
        Ok(body) => ResourceContents {
            uri: uri.to_string(),
            mime_type: MIME_JSON.to_string(),
            text: body,
        },
        Err(err) => text(uri, format!("Error serializing resource: {}", err)),
    }
}

fn text(uri: &str, message: String) -> ResourceContents {
    ResourceContents {
        uri: uri.to_string(),
        mime_type: MIME_TEXT.to_string(),
        text: message,
    }
}
