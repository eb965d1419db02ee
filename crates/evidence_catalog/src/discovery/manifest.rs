//! Manifest-driven discovery.
//!
//! Two manifest shapes are understood:
//!
//! ```text
//! {"renderedFiles": {"<source>": ["static/data/<source>/<table>/<table>.parquet", ...]}}
//! {"sources": {"<source>": {"tables": {"<table>": {...}}}}}
//! ```
//!
//! `renderedFiles` wins when both are present. Either way the data file is
//! rebuilt as `root/<source>/<table>/<table>.parquet`; entries whose file is
//! missing are dropped.

use super::load_schema_fields;
use crate::model::{Source, SourceMap, Table, PARQUET_EXTENSION, SCHEMA_SUFFIX};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Manifest file name, directly under the data root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Rendered paths shorter than this cannot name a table.
const MIN_RENDERED_SEGMENTS: usize = 4;

const RENDERED_FILES_KEY: &str = "renderedFiles";
const SOURCES_KEY: &str = "sources";

#[derive(Debug, Deserialize)]
struct ManifestSource {
    #[serde(default)]
    tables: BTreeMap<String, Value>,
}

pub(super) fn discover(root: &Path) -> Option<SourceMap> {
    let manifest_path = root.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        debug!(path = %manifest_path.display(), "No manifest");
        return None;
    }

    let mut manifest: Value = match fs::read_to_string(&manifest_path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Error reading {}: {}", MANIFEST_FILE, e);
            return None;
        }
    };

    // Each shape is decoded on its own; `sources` is only read when
    // `renderedFiles` is absent.
    if let Some(rendered) = take_key(&mut manifest, RENDERED_FILES_KEY) {
        let rendered = decode_shape::<BTreeMap<String, Vec<String>>>(rendered, RENDERED_FILES_KEY)?;
        return Some(from_rendered_files(root, rendered));
    }
    if let Some(declared) = take_key(&mut manifest, SOURCES_KEY) {
        let declared = decode_shape::<BTreeMap<String, ManifestSource>>(declared, SOURCES_KEY)?;
        return Some(from_sources(root, declared));
    }

    debug!("Manifest has neither renderedFiles nor sources");
    None
}

/// Remove a non-null top-level key from the manifest.
fn take_key(manifest: &mut Value, key: &str) -> Option<Value> {
    manifest
        .as_object_mut()
        .and_then(|object| object.remove(key))
        .filter(|value| !value.is_null())
}

fn decode_shape<T: DeserializeOwned>(value: Value, key: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Malformed {} in {}: {}", key, MANIFEST_FILE, e);
            None
        }
    }
}

fn from_rendered_files(root: &Path, rendered: BTreeMap<String, Vec<String>>) -> SourceMap {
    let mut sources = SourceMap::new();
    for (source_name, file_paths) in rendered {
        let tables = file_paths.iter().filter_map(|file_path| {
            let parts: Vec<&str> = file_path.split('/').collect();
            if parts.len() < MIN_RENDERED_SEGMENTS {
                debug!(path = %file_path, "Skipping short rendered path");
                return None;
            }
            Some(parts[parts.len() - 2])
        });
        insert_source(&mut sources, root, &source_name, tables);
    }
    sources
}

fn from_sources(root: &Path, declared: BTreeMap<String, ManifestSource>) -> SourceMap {
    let mut sources = SourceMap::new();
    for (source_name, source) in &declared {
        insert_source(
            &mut sources,
            root,
            source_name,
            source.tables.keys().map(String::as_str),
        );
    }
    sources
}

fn insert_source<'a>(
    sources: &mut SourceMap,
    root: &Path,
    source_name: &str,
    table_names: impl Iterator<Item = &'a str>,
) {
    let source_dir = root.join(source_name);
    let mut source = Source::new(source_name, source_dir.clone());

    for table_name in table_names {
        if source.tables.contains_key(table_name) {
            continue;
        }
        let table_dir = source_dir.join(table_name);
        let data_file = table_dir.join(format!("{}.{}", table_name, PARQUET_EXTENSION));
        if !data_file.is_file() {
            warn!(
                "Manifest lists {}.{} but {} does not exist",
                source_name,
                table_name,
                data_file.display()
            );
            continue;
        }

        let schema_file = table_dir.join(format!("{}{}", table_name, SCHEMA_SUFFIX));
        let (schema_file, schema_fields) = if schema_file.is_file() {
            let fields = load_schema_fields(&schema_file);
            (Some(schema_file), fields)
        } else {
            (None, Vec::new())
        };

        source.tables.insert(
            table_name.to_string(),
            Table::new(table_name, data_file, schema_file, schema_fields),
        );
    }

    if source.tables.is_empty() {
        debug!(source = %source_name, "Dropping manifest source with no reachable tables");
        return;
    }
    sources.insert(source_name.to_string(), source);
}
