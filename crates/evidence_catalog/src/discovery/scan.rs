//! Directory-structure discovery.
//!
//! Raw sources layout: any `*.sql` file under the root makes this a scripts
//! tree. Scripts are grouped by their parent directory name (the source) and
//! named by file stem (the table); the script itself stands in for the data.
//!
//! Rendered layout otherwise: `root/<source>/<table>/` where a table directory
//! holds at least one `*.parquet` file and optionally a `*.schema.json`.

use super::{is_hidden, load_schema_fields};
use crate::model::{Source, SourceMap, Table, PARQUET_EXTENSION, SCHEMA_SUFFIX, SQL_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub(super) fn discover(root: &Path) -> Option<SourceMap> {
    let sql_files = find_files(root, |path| has_extension(path, SQL_EXTENSION));
    if !sql_files.is_empty() {
        debug!(count = sql_files.len(), "Found SQL scripts, using raw sources layout");
        return Some(from_sql_scripts(sql_files));
    }
    Some(from_table_directories(root))
}

fn from_sql_scripts(sql_files: Vec<PathBuf>) -> SourceMap {
    let mut sources = SourceMap::new();
    for sql_file in sql_files {
        let (Some(source_dir), Some(table_name)) = (
            sql_file.parent(),
            sql_file.file_stem().and_then(|stem| stem.to_str()),
        ) else {
            continue;
        };
        let Some(source_name) = source_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        let table_name = table_name.to_string();
        let source = sources
            .entry(source_name.to_string())
            .or_insert_with(|| Source::new(source_name, source_dir.to_path_buf()));
        if source.tables.contains_key(&table_name) {
            warn!(
                "Duplicate script {} for {}.{}, keeping the first",
                sql_file.display(),
                source_name,
                table_name
            );
            continue;
        }
        source.tables.insert(
            table_name.clone(),
            Table::new(table_name, sql_file, None, Vec::new()),
        );
    }
    sources
}

fn from_table_directories(root: &Path) -> SourceMap {
    let mut sources = SourceMap::new();

    for source_dir in subdirectories(root) {
        let Some(source_name) = dir_name(&source_dir) else {
            continue;
        };
        if is_hidden(&source_name) {
            continue;
        }

        let mut source = Source::new(source_name.clone(), source_dir.clone());
        for table_dir in subdirectories(&source_dir) {
            let Some(table_name) = dir_name(&table_dir) else {
                continue;
            };
            if let Some(table) = scan_table_dir(&table_name, &table_dir) {
                source.tables.insert(table_name, table);
            }
        }

        if source.tables.is_empty() {
            debug!(source = %source_name, "Dropping directory with no tables");
            continue;
        }
        sources.insert(source_name, source);
    }

    sources
}

fn scan_table_dir(table_name: &str, table_dir: &Path) -> Option<Table> {
    let data_file = find_files(table_dir, |path| has_extension(path, PARQUET_EXTENSION))
        .into_iter()
        .next()?;

    let schema_file = find_files(table_dir, |path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(SCHEMA_SUFFIX))
    })
    .into_iter()
    .next();

    let schema_fields = schema_file
        .as_deref()
        .map(load_schema_fields)
        .unwrap_or_default();

    Some(Table::new(table_name, data_file, schema_file, schema_fields))
}

/// Immediate subdirectories, sorted by name. Unreadable directories yield
/// nothing.
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error scanning directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Files under `dir` (recursively, hidden directories skipped) matching
/// `filter`, in name order.
fn find_files(dir: &Path, filter: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error walking {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter(entry.path()))
        .map(DirEntry::into_path)
        .collect()
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(is_hidden)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn table_directories_layout() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(&root.join("sales/orders/orders.parquet"), "PAR1");
        write(
            &root.join("sales/orders/orders.schema.json"),
            r#"[{"name":"id","type":"INTEGER"}]"#,
        );
        write(&root.join("sales/notes/readme.txt"), "no data here");
        write(&root.join(".cache/t/t.parquet"), "PAR1");
        write(&root.join("empty/t/readme.md"), "");

        let sources = discover(root).unwrap();
        assert_eq!(sources.keys().collect::<Vec<_>>(), vec!["sales"]);

        let orders = &sources["sales"].tables["orders"];
        assert_eq!(orders.data_file, root.join("sales/orders/orders.parquet"));
        assert_eq!(orders.schema_fields[0].name, "id");
        assert_eq!(sources["sales"].table_names(), vec!["orders"]);
    }

    #[test]
    fn first_parquet_wins() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(&root.join("s/t/b.parquet"), "PAR1");
        write(&root.join("s/t/a.parquet"), "PAR1");

        let sources = discover(root).unwrap();
        assert_eq!(sources["s"].tables["t"].data_file, root.join("s/t/a.parquet"));
        assert!(sources["s"].tables["t"].schema_file.is_none());
    }

    #[test]
    fn bad_sidecar_keeps_table() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(&root.join("s/t/t.parquet"), "PAR1");
        write(&root.join("s/t/t.schema.json"), "not json");

        let sources = discover(root).unwrap();
        let table = &sources["s"].tables["t"];
        assert!(table.schema_fields.is_empty());
        assert!(table.schema_file.is_some());
    }

    #[test]
    fn sql_scripts_layout() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(&root.join("maniac_neon/orders.sql"), "select 1 as id");
        write(&root.join("maniac_neon/users.sql"), "select 2 as id");
        write(&root.join("other/deep/events.sql"), "select 3 as id");
        write(&root.join("maniac_neon/connection.yaml"), "name: neon");
        write(&root.join("sales/orders/orders.parquet"), "PAR1");

        let sources = discover(root).unwrap();
        assert_eq!(
            sources.keys().collect::<Vec<_>>(),
            vec!["deep", "maniac_neon"]
        );
        let neon = &sources["maniac_neon"];
        assert_eq!(neon.path, root.join("maniac_neon"));
        assert_eq!(neon.table_names(), vec!["orders", "users"]);
        assert!(neon.tables["orders"].data_file.ends_with("orders.sql"));
        assert_eq!(
            neon.tables["orders"].kind,
            crate::model::TableKind::SqlScript
        );
    }
}
