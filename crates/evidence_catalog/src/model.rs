//! Catalog records: sources, tables, schema fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extension of columnar data files.
pub const PARQUET_EXTENSION: &str = "parquet";

/// Extension of raw source query scripts.
pub const SQL_EXTENSION: &str = "sql";

/// Suffix of schema sidecar files.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// Source name -> Source.
pub type SourceMap = BTreeMap<String, Source>;

/// One field of a schema sidecar.
///
/// Keys beyond `name` and `type` are kept and echoed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            extra: Map::new(),
        }
    }
}

/// What backs a table's data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// A parquet file read directly by the engine
    Parquet,
    /// A SQL script whose text defines the table
    SqlScript,
}

impl TableKind {
    /// Classify a data file by its extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(SQL_EXTENSION) => TableKind::SqlScript,
            _ => TableKind::Parquet,
        }
    }
}

/// One queryable dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub data_file: PathBuf,
    pub schema_file: Option<PathBuf>,
    pub schema_fields: Vec<SchemaField>,
    pub kind: TableKind,
}

impl Table {
    pub fn new(
        name: impl Into<String>,
        data_file: PathBuf,
        schema_file: Option<PathBuf>,
        schema_fields: Vec<SchemaField>,
    ) -> Self {
        let kind = TableKind::from_path(&data_file);
        Self {
            name: name.into(),
            data_file,
            schema_file,
            schema_fields,
            kind,
        }
    }
}

/// A named grouping of tables backed by a directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
    pub tables: BTreeMap<String, Table>,
}

impl Source {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            tables: BTreeMap::new(),
        }
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Source listing entry returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub name: String,
    pub tables: Vec<String>,
    pub path: String,
}

impl From<&Source> for SourceSummary {
    fn from(source: &Source) -> Self {
        Self {
            name: source.name.clone(),
            tables: source.table_names(),
            path: source.path.display().to_string(),
        }
    }
}

/// A (source, table) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub source: String,
    pub table: String,
}

/// Name a table is queryable under: `{source}_{table}`.
///
/// The result may contain spaces or reserved words; it must always be quoted
/// when placed in SQL text.
pub fn view_name(source: &str, table: &str) -> String {
    format!("{}_{}", source, table)
}
