//! Evidence Test Utilities
//!
//! Builds throwaway Evidence project trees with real parquet files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use evidence_test_utils::ProjectFixture;
//!
//! let project = ProjectFixture::new()?;
//! project.write_parquet("sales", "orders", "SELECT range AS id FROM range(3)")?;
//! project.write_schema("sales", "orders", &[("id", "INTEGER")])?;
//!
//! let config = Config::new(project.path(), None)?;
//! ```
//!
//! The temporary directory is removed when the fixture is dropped.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where Evidence renders source data inside a project.
pub const RENDERED_DATA_SUBPATH: &str = ".evidence/template/static/data";

/// A temporary Evidence project.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Empty project with the rendered data directory created.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp project")?;
        fs::create_dir_all(dir.path().join(RENDERED_DATA_SUBPATH))
            .context("Failed to create rendered data directory")?;
        Ok(Self { dir })
    }

    /// Project root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Rendered data root.
    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join(RENDERED_DATA_SUBPATH)
    }

    /// `data/source/table/`
    pub fn table_dir(&self, source: &str, table: &str) -> PathBuf {
        self.data_dir().join(source).join(table)
    }

    /// `data/source/table/table.parquet`
    pub fn parquet_path(&self, source: &str, table: &str) -> PathBuf {
        self.table_dir(source, table).join(format!("{}.parquet", table))
    }

    /// Write the rows produced by `select` as a parquet table file.
    pub fn write_parquet(&self, source: &str, table: &str, select: &str) -> Result<PathBuf> {
        let path = self.parquet_path(source, table);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = duckdb::Connection::open_in_memory()?;
        let target = path.to_string_lossy().replace('\'', "''");
        conn.execute_batch(&format!(
            "COPY ({}) TO '{}' (FORMAT PARQUET)",
            select, target
        ))
        .with_context(|| format!("Failed to write parquet fixture {}", path.display()))?;
        Ok(path)
    }

    /// Write a schema sidecar next to the table's parquet file.
    pub fn write_schema(
        &self,
        source: &str,
        table: &str,
        fields: &[(&str, &str)],
    ) -> Result<PathBuf> {
        let fields: Vec<Value> = fields
            .iter()
            .map(|(name, ty)| json!({ "name": name, "type": ty }))
            .collect();
        self.write_schema_json(source, table, &Value::Array(fields))
    }

    /// Write arbitrary JSON as a schema sidecar.
    pub fn write_schema_json(&self, source: &str, table: &str, value: &Value) -> Result<PathBuf> {
        let path = self
            .table_dir(source, table)
            .join(format!("{}.schema.json", table));
        self.write_file(&path, &serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    /// Write `manifest.json` at the data root.
    pub fn write_manifest(&self, manifest: &Value) -> Result<PathBuf> {
        let path = self.data_dir().join("manifest.json");
        self.write_file(&path, &serde_json::to_string_pretty(manifest)?)?;
        Ok(path)
    }

    /// Write a raw source query script under `sources/source/name.sql`.
    pub fn write_sql_source(&self, source: &str, name: &str, sql: &str) -> Result<PathBuf> {
        let path = self
            .dir
            .path()
            .join("sources")
            .join(source)
            .join(format!("{}.sql", name));
        self.write_file(&path, sql)?;
        Ok(path)
    }

    /// Write any file, creating parent directories.
    pub fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// The standard two-source project used across test suites.
    ///
    /// - `sales/orders`: 5 rows (`id`, `amount`, `region`) with a sidecar
    /// - `sales/customers`: 3 rows, no sidecar
    /// - `maniac_neon_prod/referral_codes copy`: 2 rows with a sidecar
    pub fn sample() -> Result<Self> {
        let project = Self::new()?;
        project.write_parquet(
            "sales",
            "orders",
            "SELECT range::INTEGER AS id, (range * 10.5)::DOUBLE AS amount, \
             CASE WHEN range % 2 = 0 THEN 'east' ELSE 'west' END AS region \
             FROM range(1, 6)",
        )?;
        project.write_schema(
            "sales",
            "orders",
            &[("id", "INTEGER"), ("amount", "DOUBLE"), ("region", "VARCHAR")],
        )?;
        project.write_parquet(
            "sales",
            "customers",
            "SELECT * FROM (VALUES (1, 'Ada'), (2, 'Grace'), (3, 'Edsger')) AS t(id, name)",
        )?;
        project.write_parquet(
            "maniac_neon_prod",
            "referral_codes copy",
            "SELECT * FROM (VALUES ('ALPHA', 3), ('BRAVO', 7)) AS t(code, uses)",
        )?;
        project.write_schema(
            "maniac_neon_prod",
            "referral_codes copy",
            &[("code", "VARCHAR"), ("uses", "INTEGER")],
        )?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_project_layout() {
        let project = ProjectFixture::sample().unwrap();
        assert!(project.parquet_path("sales", "orders").exists());
        assert!(project
            .table_dir("sales", "orders")
            .join("orders.schema.json")
            .exists());
        assert!(project
            .parquet_path("maniac_neon_prod", "referral_codes copy")
            .exists());
        assert!(!project
            .table_dir("sales", "customers")
            .join("customers.schema.json")
            .exists());
    }
}
